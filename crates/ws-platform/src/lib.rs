//! WebShop Platform
//!
//! Core platform providing:
//! - Account identity records with Argon2id password hashing
//! - Customer profiles (1:1 with accounts)
//! - Authentication with short-lived access tokens and rotating,
//!   server-tracked refresh tokens
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access
//! - `api` - REST endpoints

// Core aggregates
pub mod account;
pub mod customer;

// Authentication
pub mod auth;

// Shared infrastructure
pub mod shared;

// Development seeding
pub mod seed;

// Re-export common types from shared
pub use shared::error::{PlatformError, Result};
pub use shared::tsid::TsidGenerator;

// Re-export main entity types for convenience
pub use account::entity::{Account, AccountRole};
pub use customer::entity::Customer;
pub use auth::refresh_token::RefreshToken;

// Re-export repositories
pub use account::repository::AccountRepository;
pub use customer::repository::CustomerRepository;
pub use auth::refresh_token_repository::RefreshTokenRepository;

// Re-export services
pub use auth::auth_service::{AccessTokenClaims, AuthConfig, AuthService};
pub use auth::authentication_service::{AuthenticationService, TokenPair};
pub use auth::password_service::PasswordService;

/// API surface re-exports
pub mod api {
    // Middleware
    pub use crate::shared::middleware::{AppState, AuthContext, AuthLayer, Authenticated, OptionalAuth};
    pub use crate::shared::api_common::{ApiError, CreatedResponse, PaginatedResponse, PaginationParams, SuccessResponse};

    // API state and router exports from each aggregate
    pub use crate::account::api::{accounts_router, AccountsState};
    pub use crate::customer::api::{customers_router, CustomersState};
    pub use crate::auth::auth_api::{authentication_router, AuthState};

    // Shared APIs
    pub use crate::shared::health_api::{health_router, HealthState};
}
