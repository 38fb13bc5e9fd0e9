//! Auth Service
//!
//! Access token (JWT) generation and validation. Access tokens are
//! short-lived, signed with HS256, and never persisted server-side;
//! the long-lived state lives in the refresh token collection.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::account::entity::Account;
use crate::shared::error::{PlatformError, Result};

/// JWT claims for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (account ID)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// JWT ID (unique identifier)
    pub jti: String,

    /// Account email
    pub email: String,

    /// Display name (customer profile name, or username without one)
    pub name: String,

    /// Account role (ADMIN or CUSTOMER)
    pub role: String,
}

/// Configuration for the auth service
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret for HS256
    pub secret_key: String,

    /// Token issuer
    pub issuer: String,

    /// Token audience
    pub audience: String,

    /// Access token expiration in seconds
    pub access_token_expiry_secs: i64,

    /// Refresh token expiration in seconds
    pub refresh_token_expiry_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            issuer: "webshop".to_string(),
            audience: "webshop".to_string(),
            access_token_expiry_secs: 900,       // 15 minutes (PT15M)
            refresh_token_expiry_secs: 86400 * 7, // 7 days (P7D)
        }
    }
}

/// Authentication service for token management
pub struct AuthService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl AuthService {
    /// Create auth service with an HMAC secret (HS256)
    pub fn new(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());

        info!("AuthService initialized with HS256");

        Self {
            config,
            encoding_key,
            decoding_key,
            algorithm: Algorithm::HS256,
        }
    }

    /// Access token lifetime in seconds (surfaced in login responses)
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.config.access_token_expiry_secs
    }

    /// Generate an access token for an account
    pub fn generate_access_token(&self, account: &Account, display_name: &str) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.access_token_expiry_secs);

        let claims = AccessTokenClaims {
            sub: account.id.clone(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: crate::TsidGenerator::generate(),
            email: account.email.clone(),
            name: display_name.to_string(),
            role: account.role.to_string(),
        };

        let header = Header::new(self.algorithm);
        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| PlatformError::Internal { message: format!("Failed to encode JWT: {}", e) })
    }

    /// Validate an access token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<AccessTokenClaims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => PlatformError::TokenExpired,
                _ => PlatformError::InvalidToken { message: format!("{}", e) },
            })
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    if auth_header.starts_with("Bearer ") {
        Some(&auth_header[7..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::entity::AccountRole;

    fn test_service() -> AuthService {
        let config = AuthConfig {
            secret_key: "12345678912345678912345678912345".to_string(),
            ..AuthConfig::default()
        };
        AuthService::new(config)
    }

    fn test_account() -> Account {
        Account::new("alex42", "alex@example.com", "$argon2id$fake")
    }

    #[test]
    fn test_generate_and_validate_token() {
        let service = test_service();
        let account = test_account();

        let token = service.generate_access_token(&account, "Alex Example").unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.email, "alex@example.com");
        assert_eq!(claims.name, "Alex Example");
        assert_eq!(claims.role, "CUSTOMER");
    }

    #[test]
    fn test_admin_role_claim() {
        let service = test_service();
        let account = test_account().with_role(AccountRole::Admin);

        let token = service.generate_access_token(&account, "Alex Example").unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.role, "ADMIN");
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let service = test_service();
        let other = AuthService::new(AuthConfig {
            secret_key: "another-secret-another-secret-32".to_string(),
            ..AuthConfig::default()
        });

        let token = other
            .generate_access_token(&test_account(), "Alex Example")
            .unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(PlatformError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_token_with_wrong_issuer_is_rejected() {
        let service = test_service();
        let other = AuthService::new(AuthConfig {
            secret_key: "12345678912345678912345678912345".to_string(),
            issuer: "someone-else".to_string(),
            ..AuthConfig::default()
        });

        let token = other
            .generate_access_token(&test_account(), "Alex Example")
            .unwrap();

        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), None);
        assert_eq!(extract_bearer_token("Basic abc123"), None);
    }
}
