//! Accounts API
//!
//! REST endpoints for account registration and management.
//! Registration is public; everything else requires a bearer token.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::account::entity::{Account, AccountRole};
use crate::account::repository::AccountRepository;
use crate::auth::password_service::PasswordService;
use crate::customer::api::CustomerSummaryResponse;
use crate::customer::repository::CustomerRepository;
use crate::shared::api_common::{PaginatedResponse, PaginationParams};
use crate::shared::error::PlatformError;
use crate::shared::middleware::{Authenticated, OptionalAuth};

/// Register account request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAccountRequest {
    /// Login name, 6..32 characters
    pub username: String,

    /// Plaintext password, hashed before storage
    pub password: String,

    /// Email address
    pub email: String,

    /// Requested role; only honored for admin callers
    #[serde(default)]
    pub role: Option<AccountRole>,
}

/// Update account request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    /// Role changes are admin-only
    pub role: Option<AccountRole>,
}

/// Account response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
    pub modified_at: String,
    /// Embedded customer profile, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerSummaryResponse>,
}

impl From<Account> for AccountResponse {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            username: a.username,
            email: a.email,
            role: a.role.to_string(),
            created_at: a.created_at.to_rfc3339(),
            modified_at: a.modified_at.to_rfc3339(),
            customer: None,
        }
    }
}

impl AccountResponse {
    pub fn with_customer(mut self, customer: CustomerSummaryResponse) -> Self {
        self.customer = Some(customer);
        self
    }
}

/// Accounts API state
#[derive(Clone)]
pub struct AccountsState {
    pub account_repo: Arc<AccountRepository>,
    pub customer_repo: Arc<CustomerRepository>,
    pub password_service: Arc<PasswordService>,
}

fn validate_registration(req: &RegisterAccountRequest) -> Result<(), PlatformError> {
    if req.username.len() < 6 || req.username.len() > 32 {
        return Err(PlatformError::validation(
            "Username must be between 6 and 32 characters",
        ));
    }
    if req.email.is_empty() || req.email.len() > 100 || !req.email.contains('@') {
        return Err(PlatformError::validation("Invalid email address"));
    }
    Ok(())
}

/// Register a new account
///
/// Creates an account with a hashed password. The role is forced to
/// CUSTOMER unless the caller presents an admin token.
#[utoipa::path(
    post,
    path = "/",
    tag = "accounts",
    operation_id = "postAccounts",
    request_body = RegisterAccountRequest,
    responses(
        (status = 200, description = "Account created", body = AccountResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Username or email already taken")
    )
)]
pub async fn register_account(
    State(state): State<AccountsState>,
    auth: OptionalAuth,
    Json(req): Json<RegisterAccountRequest>,
) -> Result<Json<AccountResponse>, PlatformError> {
    validate_registration(&req)?;

    if state.account_repo.find_by_username(&req.username).await?.is_some() {
        return Err(PlatformError::duplicate("Account", "username", &req.username));
    }
    if state.account_repo.find_by_email(&req.email).await?.is_some() {
        return Err(PlatformError::duplicate("Account", "email", &req.email));
    }

    let password_hash = state.password_service.hash_password(&req.password)?;

    let is_admin_caller = auth.0.as_ref().map(|ctx| ctx.is_admin()).unwrap_or(false);
    let role = match req.role {
        Some(role) if is_admin_caller => role,
        _ => AccountRole::Customer,
    };

    let account = Account::new(&req.username, &req.email, password_hash).with_role(role);
    state.account_repo.insert(&account).await?;

    tracing::info!(account_id = %account.id, username = %account.username, "Account registered");

    Ok(Json(AccountResponse::from(account)))
}

/// List accounts (admin only)
#[utoipa::path(
    get,
    path = "/",
    tag = "accounts",
    operation_id = "getAccounts",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated account list", body = PaginatedResponse<AccountResponse>),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_accounts(
    State(state): State<AccountsState>,
    auth: Authenticated,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<AccountResponse>>, PlatformError> {
    if !auth.is_admin() {
        return Err(PlatformError::forbidden("Admin role required"));
    }

    let accounts = state
        .account_repo
        .find_page(params.offset(), params.limit())
        .await?;
    let total = state.account_repo.count().await?;

    let data = accounts.into_iter().map(AccountResponse::from).collect();

    Ok(Json(PaginatedResponse::new(
        data,
        params.page(),
        params.size(),
        total,
    )))
}

/// Get an account by id (admin or self)
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "accounts",
    operation_id = "getAccountById",
    params(("id" = String, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account found", body = AccountResponse),
        (status = 403, description = "Caller may not read this account"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_account(
    State(state): State<AccountsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, PlatformError> {
    if !auth.can_access_account(&id) {
        return Err(PlatformError::forbidden("Cannot access another account"));
    }

    let account = state
        .account_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::AccountNotFound { id: id.clone() })?;

    let mut response = AccountResponse::from(account);
    if let Some(customer) = state.customer_repo.find_by_account(&id).await? {
        response = response.with_customer(CustomerSummaryResponse::from(customer));
    }

    Ok(Json(response))
}

/// Update an account (admin or self; role changes admin-only)
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "accounts",
    operation_id = "putAccountById",
    params(("id" = String, Path, description = "Account ID")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = AccountResponse),
        (status = 403, description = "Caller may not update this account"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Username or email already taken")
    )
)]
pub async fn update_account(
    State(state): State<AccountsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateAccountRequest>,
) -> Result<Json<AccountResponse>, PlatformError> {
    if !auth.can_access_account(&id) {
        return Err(PlatformError::forbidden("Cannot update another account"));
    }
    if req.role.is_some() && !auth.is_admin() {
        return Err(PlatformError::forbidden("Only admins may change roles"));
    }

    let mut account = state
        .account_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::AccountNotFound { id: id.clone() })?;

    if let Some(ref username) = req.username {
        if username.len() < 6 || username.len() > 32 {
            return Err(PlatformError::validation(
                "Username must be between 6 and 32 characters",
            ));
        }
        if let Some(existing) = state.account_repo.find_by_username(username).await? {
            if existing.id != account.id {
                return Err(PlatformError::duplicate("Account", "username", username));
            }
        }
    }
    if let Some(ref email) = req.email {
        if email.is_empty() || !email.contains('@') {
            return Err(PlatformError::validation("Invalid email address"));
        }
        if let Some(existing) = state.account_repo.find_by_email(email).await? {
            if existing.id != account.id {
                return Err(PlatformError::duplicate("Account", "email", email));
            }
        }
    }

    account.update(req.username, req.email, req.role);
    state.account_repo.update(&account).await?;

    Ok(Json(AccountResponse::from(account)))
}

/// Create the accounts router
pub fn accounts_router(state: AccountsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(register_account, list_accounts))
        .routes(routes!(get_account, update_account))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_deserialization() {
        let json = r#"{"username":"alex42","password":"Passw0rd","email":"alex@example.com"}"#;
        let req: RegisterAccountRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.username, "alex42");
        assert_eq!(req.email, "alex@example.com");
        assert!(req.role.is_none());
    }

    #[test]
    fn test_registration_validation_rejects_short_username() {
        let req = RegisterAccountRequest {
            username: "alex".to_string(),
            password: "Passw0rd".to_string(),
            email: "alex@example.com".to_string(),
            role: None,
        };
        assert!(validate_registration(&req).is_err());
    }

    #[test]
    fn test_registration_validation_rejects_bad_email() {
        let req = RegisterAccountRequest {
            username: "alex42".to_string(),
            password: "Passw0rd".to_string(),
            email: "not-an-email".to_string(),
            role: None,
        };
        assert!(validate_registration(&req).is_err());
    }

    #[test]
    fn test_account_response_serialization() {
        let account = Account::new("alex42", "alex@example.com", "$argon2id$fake");
        let response = AccountResponse::from(account);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"username\":\"alex42\""));
        assert!(json.contains("\"role\":\"CUSTOMER\""));
        // No profile yet, so the field is omitted entirely
        assert!(!json.contains("customer"));
    }
}
