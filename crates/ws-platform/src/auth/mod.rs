//! Authentication Aggregate
//!
//! Credential verification, access tokens, and refresh-token rotation.

// Core auth
pub mod auth_api;
pub mod auth_service;
pub mod authentication_service;
pub mod password_service;

// Refresh tokens
pub mod refresh_token;
pub mod refresh_token_repository;

// Re-export main types
pub use auth_api::{authentication_router, AuthState};
pub use auth_service::{AuthConfig, AuthService};
pub use authentication_service::{AuthenticationService, TokenPair};
pub use password_service::PasswordService;
pub use refresh_token::RefreshToken;
pub use refresh_token_repository::RefreshTokenRepository;
