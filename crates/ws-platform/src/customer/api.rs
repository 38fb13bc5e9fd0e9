//! Customers API
//!
//! REST endpoints for the 1:1 customer profile attached to an account.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::account::repository::AccountRepository;
use crate::customer::entity::Customer;
use crate::customer::repository::CustomerRepository;
use crate::shared::api_common::{PaginatedResponse, PaginationParams};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;

/// Create customer profile request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    /// Owning account ID
    pub account_id: String,

    pub first_name: String,
    pub last_name: String,

    #[serde(default)]
    pub phone_number: String,

    #[serde(default)]
    pub country: String,

    #[serde(default)]
    pub zip_code: i32,

    #[serde(default)]
    pub gender: String,
}

/// Update customer profile request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<i32>,
    pub gender: Option<String>,
}

/// Full customer response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: String,
    pub account_id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub country: String,
    pub zip_code: i32,
    pub gender: String,
    pub created_at: String,
    pub modified_at: String,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            account_id: c.account_id,
            first_name: c.first_name,
            last_name: c.last_name,
            phone_number: c.phone_number,
            country: c.country,
            zip_code: c.zip_code,
            gender: c.gender,
            created_at: c.created_at.to_rfc3339(),
            modified_at: c.modified_at.to_rfc3339(),
        }
    }
}

/// Compact customer projection embedded in account responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummaryResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub country: String,
    pub zip_code: i32,
    pub gender: String,
}

impl From<Customer> for CustomerSummaryResponse {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            first_name: c.first_name,
            last_name: c.last_name,
            phone_number: c.phone_number,
            country: c.country,
            zip_code: c.zip_code,
            gender: c.gender,
        }
    }
}

/// Customers API state
#[derive(Clone)]
pub struct CustomersState {
    pub customer_repo: Arc<CustomerRepository>,
    pub account_repo: Arc<AccountRepository>,
}

/// Create a customer profile (admin or the owning account)
#[utoipa::path(
    post,
    path = "/",
    tag = "customers",
    operation_id = "postCustomers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 200, description = "Profile created", body = CustomerResponse),
        (status = 403, description = "Caller may not create this profile"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Account already has a profile")
    )
)]
pub async fn create_customer(
    State(state): State<CustomersState>,
    auth: Authenticated,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<Json<CustomerResponse>, PlatformError> {
    if !auth.can_access_account(&req.account_id) {
        return Err(PlatformError::forbidden("Cannot create a profile for another account"));
    }

    state
        .account_repo
        .find_by_id(&req.account_id)
        .await?
        .ok_or_else(|| PlatformError::AccountNotFound { id: req.account_id.clone() })?;

    if state.customer_repo.find_by_account(&req.account_id).await?.is_some() {
        return Err(PlatformError::duplicate("Customer", "accountId", &req.account_id));
    }

    let customer = Customer::new(&req.account_id, &req.first_name, &req.last_name)
        .with_contact(&req.phone_number, &req.country, req.zip_code)
        .with_gender(&req.gender);
    state.customer_repo.insert(&customer).await?;

    tracing::info!(customer_id = %customer.id, account_id = %customer.account_id, "Customer profile created");

    Ok(Json(CustomerResponse::from(customer)))
}

/// List customer profiles (admin only)
#[utoipa::path(
    get,
    path = "/",
    tag = "customers",
    operation_id = "getCustomers",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated customer list", body = PaginatedResponse<CustomerResponse>),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_customers(
    State(state): State<CustomersState>,
    auth: Authenticated,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<CustomerResponse>>, PlatformError> {
    if !auth.is_admin() {
        return Err(PlatformError::forbidden("Admin role required"));
    }

    let customers = state
        .customer_repo
        .find_page(params.offset(), params.limit())
        .await?;
    let total = state.customer_repo.count().await?;

    let data = customers.into_iter().map(CustomerResponse::from).collect();

    Ok(Json(PaginatedResponse::new(
        data,
        params.page(),
        params.size(),
        total,
    )))
}

/// Get a customer profile by id (admin or the owning account)
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "customers",
    operation_id = "getCustomerById",
    params(("id" = String, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Profile found", body = CustomerResponse),
        (status = 403, description = "Caller may not read this profile"),
        (status = 404, description = "Profile not found")
    )
)]
pub async fn get_customer(
    State(state): State<CustomersState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<CustomerResponse>, PlatformError> {
    let customer = state
        .customer_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::CustomerNotFound { id: id.clone() })?;

    if !auth.can_access_account(&customer.account_id) {
        return Err(PlatformError::forbidden("Cannot access another account's profile"));
    }

    Ok(Json(CustomerResponse::from(customer)))
}

/// Update a customer profile (admin or the owning account)
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "customers",
    operation_id = "putCustomerById",
    params(("id" = String, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Profile updated", body = CustomerResponse),
        (status = 403, description = "Caller may not update this profile"),
        (status = 404, description = "Profile not found")
    )
)]
pub async fn update_customer(
    State(state): State<CustomersState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateCustomerRequest>,
) -> Result<Json<CustomerResponse>, PlatformError> {
    let mut customer = state
        .customer_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::CustomerNotFound { id: id.clone() })?;

    if !auth.can_access_account(&customer.account_id) {
        return Err(PlatformError::forbidden("Cannot update another account's profile"));
    }

    customer.update(
        req.first_name,
        req.last_name,
        req.phone_number,
        req.country,
        req.zip_code,
        req.gender,
    );
    state.customer_repo.update(&customer).await?;

    Ok(Json(CustomerResponse::from(customer)))
}

/// Create the customers router
pub fn customers_router(state: CustomersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_customer, list_customers))
        .routes(routes!(get_customer, update_customer))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults_optional_fields() {
        let json = r#"{"accountId":"0HZXEQ5Y8JY5Z","firstName":"Alex","lastName":"Example"}"#;
        let req: CreateCustomerRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.account_id, "0HZXEQ5Y8JY5Z");
        assert!(req.phone_number.is_empty());
        assert_eq!(req.zip_code, 0);
    }

    #[test]
    fn test_customer_response_projection() {
        let customer = Customer::new("0HZXEQ5Y8JY5Z", "Alex", "Example")
            .with_contact("42483787", "Danmark", 2620)
            .with_gender("Male");
        let response = CustomerResponse::from(customer.clone());

        assert_eq!(response.account_id, "0HZXEQ5Y8JY5Z");
        assert_eq!(response.country, "Danmark");

        let summary = CustomerSummaryResponse::from(customer);
        assert_eq!(summary.first_name, "Alex");
        assert_eq!(summary.zip_code, 2620);
    }
}
