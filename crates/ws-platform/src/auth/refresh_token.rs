//! Refresh Token Entity
//!
//! Long-lived, server-tracked random value used to mint new access tokens
//! without re-entering a password. Tokens are never deleted, only marked
//! revoked, so every rotation chain stays readable as an audit trail.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc, Duration};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use crate::TsidGenerator;

/// Default refresh token expiry: 7 days
const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// Refresh token entity
///
/// Stored in the database to enable:
/// 1. Token validation and exchange for new access tokens
/// 2. Token revocation (logout, security events)
/// 3. Token rotation (one-time use: each value is replaced on exchange)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    /// TSID as primary key
    #[serde(rename = "_id")]
    pub id: String,

    /// The opaque token value handed to the client (cryptographically random)
    pub token: String,

    /// Owning account; a token is never shared between accounts
    pub account_id: String,

    /// When the token was created
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    /// When the token expires
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,

    /// IP address the token was issued to
    pub created_by_ip: String,

    /// When the token was revoked (rotation or explicit logout)
    #[serde(skip_serializing_if = "Option::is_none", default, with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional")]
    pub revoked_at: Option<DateTime<Utc>>,

    /// IP address the revocation is attributed to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_by_ip: Option<String>,

    /// Value of the token that replaced this one during rotation.
    /// Left unset on explicit revoke, which distinguishes logout from
    /// rotation in the audit trail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_by_token: Option<String>,
}

impl RefreshToken {
    /// Create a new refresh token bound to the issuing IP
    pub fn generate(account_id: impl Into<String>, ip_address: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TsidGenerator::generate(),
            token: Self::generate_token_value(),
            account_id: account_id.into(),
            created_at: now,
            expires_at: now + Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
            created_by_ip: ip_address.into(),
            revoked_at: None,
            revoked_by_ip: None,
            replaced_by_token: None,
        }
    }

    /// Create with custom expiry duration
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expires_at = self.created_at + expiry;
        self
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Check if the token has been revoked
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Active = unexpired and unrevoked
    pub fn is_active(&self) -> bool {
        !self.is_revoked() && !self.is_expired()
    }

    /// Check if this token was replaced during rotation.
    /// An already-replaced token being presented again is a replay.
    pub fn was_replaced(&self) -> bool {
        self.replaced_by_token.is_some()
    }

    /// Revoke the token, attributing the caller's IP.
    /// Returns false without mutating anything if the token is not active.
    pub fn revoke(&mut self, ip_address: impl Into<String>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.revoked_at = Some(Utc::now());
        self.revoked_by_ip = Some(ip_address.into());
        true
    }

    /// Revoke the token as part of rotation, recording its successor.
    /// Returns false without mutating anything if the token is not active.
    pub fn revoke_and_replace(
        &mut self,
        ip_address: impl Into<String>,
        successor_token: impl Into<String>,
    ) -> bool {
        if !self.revoke(ip_address) {
            return false;
        }
        self.replaced_by_token = Some(successor_token.into());
        true
    }

    /// Generate a cryptographically random token value
    pub fn generate_token_value() -> String {
        use rand::RngCore;
        use base64::Engine;

        let mut bytes = [0u8; 64];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_token_is_active() {
        let token = RefreshToken::generate("account-1", "127.0.0.1");

        assert!(!token.token.is_empty());
        assert_eq!(token.account_id, "account-1");
        assert_eq!(token.created_by_ip, "127.0.0.1");
        assert!(token.is_active());
        assert!(!token.is_expired());
        assert!(!token.is_revoked());
        assert!(!token.was_replaced());
    }

    #[test]
    fn test_token_values_are_unique() {
        let a = RefreshToken::generate_token_value();
        let b = RefreshToken::generate_token_value();
        assert_ne!(a, b);
    }

    #[test]
    fn test_expired_token_is_inactive() {
        let token = RefreshToken::generate("account-1", "127.0.0.1")
            .with_expiry(Duration::seconds(-1));

        assert!(token.is_expired());
        assert!(!token.is_revoked());
        assert!(!token.is_active());
    }

    #[test]
    fn test_revoke_sets_fields_once() {
        let mut token = RefreshToken::generate("account-1", "127.0.0.1");

        assert!(token.revoke("1.2.3.4"));
        assert!(!token.is_active());
        let revoked_at = token.revoked_at;
        assert_eq!(token.revoked_by_ip.as_deref(), Some("1.2.3.4"));
        // Explicit revoke never records a successor
        assert!(token.replaced_by_token.is_none());

        // Second revoke fails and leaves the original attribution untouched
        assert!(!token.revoke("5.6.7.8"));
        assert_eq!(token.revoked_at, revoked_at);
        assert_eq!(token.revoked_by_ip.as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn test_revoke_fails_on_expired_token() {
        let mut token = RefreshToken::generate("account-1", "127.0.0.1")
            .with_expiry(Duration::seconds(-1));

        assert!(!token.revoke("1.2.3.4"));
        assert!(token.revoked_at.is_none());
    }

    #[test]
    fn test_rotation_records_successor() {
        let mut old = RefreshToken::generate("account-1", "127.0.0.1");
        let new = RefreshToken::generate("account-1", "1.2.3.4");

        assert!(old.revoke_and_replace("1.2.3.4", new.token.clone()));
        assert!(!old.is_active());
        assert!(old.was_replaced());
        assert_eq!(old.replaced_by_token.as_deref(), Some(new.token.as_str()));
        assert_eq!(old.revoked_by_ip.as_deref(), Some("1.2.3.4"));
        assert!(new.is_active());
    }

    #[test]
    fn test_rotated_token_cannot_rotate_again() {
        let mut token = RefreshToken::generate("account-1", "127.0.0.1");
        assert!(token.revoke_and_replace("1.2.3.4", "successor-1"));

        // Replay: the same token presented a second time must fail
        assert!(!token.revoke_and_replace("1.2.3.4", "successor-2"));
        assert_eq!(token.replaced_by_token.as_deref(), Some("successor-1"));
    }
}
