//! Authentication API Endpoints
//!
//! - POST /api/authentication - Password login; sets the refresh cookie
//! - PUT /api/authentication - Rotate the refresh token from the cookie
//! - DELETE /api/authentication - Revoke the refresh token from the cookie
//!
//! The refresh token travels only in an HttpOnly, SameSite=Strict cookie;
//! the access token is returned in the body and presented as a bearer token.

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use crate::auth::authentication_service::{AuthenticationService, TokenPair};
use crate::shared::api_common::SuccessResponse;
use crate::shared::error::PlatformError;

/// Authentication request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationRequest {
    /// Username or email, matched exactly as stored
    pub username_email: String,

    /// Plaintext password
    pub password: String,
}

/// Authentication response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponse {
    /// Short-lived signed access token
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    /// The refresh token, also set as a cookie
    pub refresh_token: String,
}

impl From<TokenPair> for AuthenticationResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            token_type: "Bearer".to_string(),
            expires_in: pair.expires_in,
            refresh_token: pair.refresh_token,
        }
    }
}

/// Authentication API state
#[derive(Clone)]
pub struct AuthState {
    pub authentication_service: Arc<AuthenticationService>,
    /// Refresh cookie name (default: "refreshToken")
    pub refresh_cookie_name: String,
    /// Whether to set the Secure flag on the cookie
    pub refresh_cookie_secure: bool,
    /// Refresh cookie lifetime in seconds
    pub refresh_cookie_max_age_secs: i64,
}

impl AuthState {
    /// Create with default cookie settings
    pub fn new(authentication_service: Arc<AuthenticationService>) -> Self {
        Self {
            authentication_service,
            refresh_cookie_name: "refreshToken".to_string(),
            refresh_cookie_secure: false,
            refresh_cookie_max_age_secs: 86400 * 7, // matches the token's 7-day expiry
        }
    }

    /// Configure refresh cookie settings
    pub fn with_refresh_cookie_settings(
        mut self,
        name: &str,
        secure: bool,
        max_age_secs: i64,
    ) -> Self {
        self.refresh_cookie_name = name.to_string();
        self.refresh_cookie_secure = secure;
        self.refresh_cookie_max_age_secs = max_age_secs;
        self
    }

    fn build_refresh_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.refresh_cookie_name.clone(), value))
            .path("/")
            .http_only(true)
            .secure(self.refresh_cookie_secure)
            .same_site(SameSite::Strict)
            .max_age(time::Duration::seconds(self.refresh_cookie_max_age_secs))
            .build()
    }
}

/// Resolve the caller's IP: X-Forwarded-For wins, otherwise the transport
/// remote address with IPv4-mapped IPv6 rendered in IPv4 textual form.
fn client_ip(headers: &HeaderMap, remote: SocketAddr) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    match remote.ip() {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.to_string(),
            None => v6.to_string(),
        },
    }
}

/// Log in with username/email and password
///
/// On success, sets the refresh token cookie and returns the access token.
/// Unknown identifier and wrong password are indistinguishable to the caller.
#[utoipa::path(
    post,
    path = "/",
    tag = "authentication",
    operation_id = "postAuthentication",
    request_body = AuthenticationRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthenticationResponse),
        (status = 401, description = "Incorrect username/email or password")
    )
)]
pub async fn authenticate(
    State(state): State<AuthState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(req): Json<AuthenticationRequest>,
) -> Result<impl IntoResponse, PlatformError> {
    let ip = client_ip(&headers, remote);

    let pair = state
        .authentication_service
        .authenticate(&req.username_email, &req.password, &ip)
        .await?
        .ok_or(PlatformError::InvalidCredentials)?;

    let jar = jar.add(state.build_refresh_cookie(pair.refresh_token.clone()));

    Ok((jar, Json(AuthenticationResponse::from(pair))))
}

/// Rotate the refresh token
///
/// Reads the refresh token from the cookie, revokes it, and issues a new
/// pair. A token can only be exchanged once; replays are rejected.
#[utoipa::path(
    put,
    path = "/",
    tag = "authentication",
    operation_id = "putAuthentication",
    responses(
        (status = 200, description = "Token rotated", body = AuthenticationResponse),
        (status = 400, description = "Missing refresh token cookie"),
        (status = 401, description = "Unknown, expired, or already-used refresh token")
    )
)]
pub async fn rotate_token(
    State(state): State<AuthState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<impl IntoResponse, PlatformError> {
    let token = jar
        .get(&state.refresh_cookie_name)
        .map(|c| c.value().to_string())
        .ok_or_else(|| PlatformError::validation("Missing refresh token"))?;

    let ip = client_ip(&headers, remote);

    let pair = state
        .authentication_service
        .rotate(&token, &ip)
        .await?
        .ok_or_else(|| PlatformError::InvalidToken {
            message: "Refresh token is unknown, expired, or already used".to_string(),
        })?;

    let jar = jar.add(state.build_refresh_cookie(pair.refresh_token.clone()));

    Ok((jar, Json(AuthenticationResponse::from(pair))))
}

/// Revoke the refresh token (logout)
///
/// Reads the refresh token from the cookie and marks it revoked. Revoking
/// a token that is already inactive reports failure, not an error.
#[utoipa::path(
    delete,
    path = "/",
    tag = "authentication",
    operation_id = "deleteAuthentication",
    responses(
        (status = 200, description = "Token revoked", body = SuccessResponse),
        (status = 400, description = "Missing cookie or token not active")
    )
)]
pub async fn revoke_token(
    State(state): State<AuthState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Json<SuccessResponse>, PlatformError> {
    let token = jar
        .get(&state.refresh_cookie_name)
        .map(|c| c.value().to_string())
        .ok_or_else(|| PlatformError::validation("Missing refresh token"))?;

    let ip = client_ip(&headers, remote);

    let revoked = state.authentication_service.revoke(&token, &ip).await?;
    if !revoked {
        return Err(PlatformError::validation("Unable to revoke token"));
    }

    Ok(Json(SuccessResponse::ok()))
}

/// Create the authentication router
pub fn authentication_router(state: AuthState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(authenticate, rotate_token, revoke_token))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_request_deserialization() {
        let json = r#"{"usernameEmail":"alex","password":"Passw0rd"}"#;
        let req: AuthenticationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.username_email, "alex");
        assert_eq!(req.password, "Passw0rd");
    }

    #[test]
    fn test_authentication_response_serialization() {
        let response = AuthenticationResponse::from(TokenPair {
            access_token: "jwt".to_string(),
            refresh_token: "refresh".to_string(),
            expires_in: 900,
        });

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"accessToken\":\"jwt\""));
        assert!(json.contains("\"tokenType\":\"Bearer\""));
        assert!(json.contains("\"expiresIn\":900"));
        assert!(json.contains("\"refreshToken\":\"refresh\""));
    }

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 70.41.3.18".parse().unwrap());
        let remote: SocketAddr = "10.0.0.1:9999".parse().unwrap();

        assert_eq!(client_ip(&headers, remote), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_falls_back_to_remote_addr() {
        let headers = HeaderMap::new();
        let remote: SocketAddr = "192.168.0.10:51234".parse().unwrap();

        assert_eq!(client_ip(&headers, remote), "192.168.0.10");
    }

    #[test]
    fn test_client_ip_maps_ipv4_mapped_ipv6() {
        let headers = HeaderMap::new();
        let remote: SocketAddr = "[::ffff:192.168.0.10]:51234".parse().unwrap();

        assert_eq!(client_ip(&headers, remote), "192.168.0.10");
    }

    #[test]
    fn test_client_ip_keeps_plain_ipv6() {
        let headers = HeaderMap::new();
        let remote: SocketAddr = "[2001:db8::1]:443".parse().unwrap();

        assert_eq!(client_ip(&headers, remote), "2001:db8::1");
    }

    #[test]
    fn test_refresh_cookie_attributes() {
        let state_cookie = Cookie::build(("refreshToken".to_string(), "value".to_string()))
            .path("/")
            .http_only(true)
            .secure(false)
            .same_site(SameSite::Strict)
            .max_age(time::Duration::seconds(86400 * 7))
            .build();

        assert_eq!(state_cookie.name(), "refreshToken");
        assert_eq!(state_cookie.http_only(), Some(true));
        assert_eq!(state_cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(state_cookie.max_age(), Some(time::Duration::days(7)));
    }
}
