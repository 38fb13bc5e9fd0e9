//! Authentication Service
//!
//! Credential verification, refresh-token rotation, and revocation.
//!
//! All three operations follow the same shape: look the state up, decide,
//! mutate once. Absence ("not found", "token inactive", "wrong password")
//! is reported as `Ok(None)` / `Ok(false)`; only datastore faults become
//! errors. The rotation path claims the old token through a conditional
//! update, so a replayed or concurrently-rotated token loses the claim and
//! comes back as `None`.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::account::entity::Account;
use crate::account::repository::AccountRepository;
use crate::auth::auth_service::AuthService;
use crate::auth::password_service::PasswordService;
use crate::auth::refresh_token::RefreshToken;
use crate::auth::refresh_token_repository::RefreshTokenRepository;
use crate::customer::repository::CustomerRepository;
use crate::shared::error::{PlatformError, Result};

/// An access token plus the refresh token that can renew it
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Orchestrates login, rotation, and revocation over the repositories
pub struct AuthenticationService {
    account_repo: Arc<AccountRepository>,
    customer_repo: Arc<CustomerRepository>,
    refresh_token_repo: Arc<RefreshTokenRepository>,
    auth_service: Arc<AuthService>,
    password_service: Arc<PasswordService>,
}

impl AuthenticationService {
    pub fn new(
        account_repo: Arc<AccountRepository>,
        customer_repo: Arc<CustomerRepository>,
        refresh_token_repo: Arc<RefreshTokenRepository>,
        auth_service: Arc<AuthService>,
        password_service: Arc<PasswordService>,
    ) -> Self {
        Self {
            account_repo,
            customer_repo,
            refresh_token_repo,
            auth_service,
            password_service,
        }
    }

    /// Verify credentials and issue a fresh token pair.
    ///
    /// The identifier may be a username or an email. Unknown identifier and
    /// wrong password produce the same `None`, so callers cannot probe for
    /// which accounts exist.
    pub async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
        ip_address: &str,
    ) -> Result<Option<TokenPair>> {
        let Some(account) = self
            .account_repo
            .find_by_username_or_email(identifier)
            .await?
        else {
            debug!("Authentication failed: unknown identifier");
            return Ok(None);
        };

        let password_valid = self
            .password_service
            .verify_password(password, &account.password_hash)
            .unwrap_or(false);

        if !password_valid {
            warn!(account_id = %account.id, "Authentication failed: wrong password");
            return Ok(None);
        }

        let access_token = self.issue_access_token(&account).await?;

        let refresh_token = RefreshToken::generate(&account.id, ip_address);
        self.refresh_token_repo.insert(&refresh_token).await?;

        info!(account_id = %account.id, ip = ip_address, "Account authenticated");

        Ok(Some(TokenPair {
            access_token,
            refresh_token: refresh_token.token,
            expires_in: self.auth_service.access_token_expiry_secs(),
        }))
    }

    /// Exchange an active refresh token for a new pair, revoking the old one.
    ///
    /// One-time use: the old token is claimed through a conditional update
    /// that records the successor value. Presenting an already-rotated token
    /// again (replay) finds it inactive and returns `None`.
    pub async fn rotate(&self, token: &str, ip_address: &str) -> Result<Option<TokenPair>> {
        let Some(stored) = self.refresh_token_repo.find_by_token(token).await? else {
            debug!("Rotation failed: token not found");
            return Ok(None);
        };

        if !stored.is_active() {
            warn!(
                account_id = %stored.account_id,
                replayed = stored.was_replaced(),
                ip = ip_address,
                "Rotation rejected: token inactive"
            );
            return Ok(None);
        }

        let successor = RefreshToken::generate(&stored.account_id, ip_address);

        // Claim the old token before the successor exists. Losing the claim
        // means a concurrent rotation already rotated this value.
        let claimed = self
            .refresh_token_repo
            .revoke_active(token, ip_address, Some(&successor.token))
            .await?;
        if !claimed {
            warn!(account_id = %stored.account_id, "Rotation lost the revocation race");
            return Ok(None);
        }

        self.refresh_token_repo.insert(&successor).await?;

        let account = self
            .account_repo
            .find_by_id(&stored.account_id)
            .await?
            .ok_or_else(|| {
                PlatformError::internal(format!(
                    "Refresh token {} references missing account {}",
                    stored.id, stored.account_id
                ))
            })?;

        info!(account_id = %account.id, ip = ip_address, "Refresh token rotated");

        let access_token = self.issue_access_token(&account).await?;
        Ok(Some(TokenPair {
            access_token,
            refresh_token: successor.token,
            expires_in: self.auth_service.access_token_expiry_secs(),
        }))
    }

    /// Revoke an active refresh token (logout).
    ///
    /// Returns `false` for unknown or inactive tokens; a second revoke of
    /// the same token fails without touching the recorded attribution. No
    /// successor is recorded, which separates logout from rotation in the
    /// audit trail.
    pub async fn revoke(&self, token: &str, ip_address: &str) -> Result<bool> {
        let Some(stored) = self.refresh_token_repo.find_by_token(token).await? else {
            debug!("Revocation failed: token not found");
            return Ok(false);
        };

        if !stored.is_active() {
            debug!(account_id = %stored.account_id, "Revocation failed: token inactive");
            return Ok(false);
        }

        let revoked = self
            .refresh_token_repo
            .revoke_active(token, ip_address, None)
            .await?;

        if revoked {
            info!(account_id = %stored.account_id, ip = ip_address, "Refresh token revoked");
        }

        Ok(revoked)
    }

    /// Build the access token, pulling the display name from the customer
    /// profile when the account has one.
    async fn issue_access_token(&self, account: &Account) -> Result<String> {
        let display_name = match self.customer_repo.find_by_account(&account.id).await? {
            Some(customer) => {
                let name = customer.display_name();
                if name.is_empty() {
                    account.username.clone()
                } else {
                    name
                }
            }
            None => account.username.clone(),
        };

        self.auth_service.generate_access_token(account, &display_name)
    }
}

#[cfg(test)]
mod tests {
    // The decision logic (activity rules, one-time rotation, revoke-once)
    // is covered by the entity tests in refresh_token.rs; exercising the
    // full service requires a MongoDB connection and lives in integration
    // environments.
}
