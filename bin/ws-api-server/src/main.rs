//! WebShop API Server
//!
//! Production server for the storefront REST APIs:
//! - Authentication: login, refresh-token rotation, revocation
//! - Accounts: registration and management
//! - Customers: profile management
//! - Monitoring: health probes, metrics
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `WS_API_PORT` | `8080` | HTTP API port |
//! | `WS_METRICS_PORT` | `9090` | Metrics/health port |
//! | `WS_MONGO_URL` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `WS_MONGO_DB` | `webshop` | MongoDB database name |
//! | `WS_JWT_SECRET` | - | JWT signing secret (required) |
//! | `WS_JWT_ISSUER` | `webshop` | JWT issuer claim |
//! | `WS_COOKIE_SECURE` | `false` | Set the Secure flag on the refresh cookie |
//! | `WS_DEV_MODE` | `false` | Seed development accounts on startup |
//! | `RUST_LOG` | `info` | Log level |

use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::get,
    response::Json,
    Router,
};
use utoipa_axum::router::OpenApiRouter;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use anyhow::{Context, Result};
use tracing::info;
use tokio::{signal, net::TcpListener};
use utoipa_swagger_ui::SwaggerUi;

use ws_platform::{
    AccountRepository, AuthConfig, AuthService, AuthenticationService,
    CustomerRepository, PasswordService, RefreshTokenRepository,
};
use ws_platform::api::{
    accounts_router, authentication_router, customers_router, health_router,
    AccountsState, AppState, AuthState, CustomersState, HealthState,
};
use ws_platform::api::AuthLayer;
use ws_platform::seed::DevDataSeeder;
use ws_platform::shared::indexes::initialize_indexes;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

/// Server configuration, read from the environment once at startup and
/// handed down by value. Nothing reads configuration ambiently after this.
#[derive(Debug, Clone)]
struct ServerConfig {
    api_port: u16,
    metrics_port: u16,
    mongo_url: String,
    mongo_db: String,
    jwt_secret: String,
    jwt_issuer: String,
    cookie_secure: bool,
    dev_mode: bool,
}

impl ServerConfig {
    fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("WS_JWT_SECRET")
            .context("WS_JWT_SECRET must be set (JWT signing secret)")?;

        Ok(Self {
            api_port: env_or_parse("WS_API_PORT", 8080),
            metrics_port: env_or_parse("WS_METRICS_PORT", 9090),
            mongo_url: env_or("WS_MONGO_URL", "mongodb://localhost:27017"),
            mongo_db: env_or("WS_MONGO_DB", "webshop"),
            jwt_secret,
            jwt_issuer: env_or("WS_JWT_ISSUER", "webshop"),
            cookie_secure: env_flag("WS_COOKIE_SECURE"),
            dev_mode: env_flag("WS_DEV_MODE"),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    ws_common::logging::init_logging("ws-api-server");

    info!("Starting WebShop API Server");

    let config = ServerConfig::from_env()?;

    // Connect to MongoDB
    info!("Connecting to MongoDB: {}/{}", config.mongo_url, config.mongo_db);
    let mongo_client = mongodb::Client::with_uri_str(&config.mongo_url).await?;
    let db = mongo_client.database(&config.mongo_db);

    initialize_indexes(&db).await?;

    // Seed development data if in dev mode
    if config.dev_mode {
        let seeder = DevDataSeeder::new(db.clone());
        if let Err(e) = seeder.seed().await {
            tracing::warn!("Dev data seeding skipped (data may already exist): {}", e);
        }
    }

    // Initialize repositories
    let account_repo = Arc::new(AccountRepository::new(&db));
    let customer_repo = Arc::new(CustomerRepository::new(&db));
    let refresh_token_repo = Arc::new(RefreshTokenRepository::new(&db));
    info!("Repositories initialized");

    // Initialize services
    let auth_config = AuthConfig {
        secret_key: config.jwt_secret.clone(),
        issuer: config.jwt_issuer.clone(),
        audience: "webshop".to_string(),
        access_token_expiry_secs: 900,
        refresh_token_expiry_secs: 86400 * 7,
    };
    let refresh_cookie_max_age_secs = auth_config.refresh_token_expiry_secs;
    let auth_service = Arc::new(AuthService::new(auth_config));
    let password_service = Arc::new(PasswordService::default());
    let authentication_service = Arc::new(AuthenticationService::new(
        account_repo.clone(),
        customer_repo.clone(),
        refresh_token_repo.clone(),
        auth_service.clone(),
        password_service.clone(),
    ));
    info!("Auth services initialized");

    // Create AppState for the auth middleware
    let app_state = AppState {
        auth_service: auth_service.clone(),
    };

    // Build API states
    let auth_state = AuthState::new(authentication_service)
        .with_refresh_cookie_settings("refreshToken", config.cookie_secure, refresh_cookie_max_age_secs);
    let accounts_state = AccountsState {
        account_repo: account_repo.clone(),
        customer_repo: customer_repo.clone(),
        password_service,
    };
    let customers_state = CustomersState {
        customer_repo,
        account_repo,
    };
    let health_state = HealthState::new(Some(db.clone()), Some(env!("CARGO_PKG_VERSION").to_string()));

    // Build API router using OpenApiRouter for auto-collected OpenAPI paths
    let (router, mut openapi) = OpenApiRouter::new()
        .nest("/api/authentication", authentication_router(auth_state))
        .nest("/api/accounts", accounts_router(accounts_state))
        .nest("/api/customers", customers_router(customers_state))
        .split_for_parts();

    // Update OpenAPI info
    openapi.info.title = "WebShop API".to_string();
    openapi.info.version = "1.0.0".to_string();
    openapi.info.description = Some("REST APIs for authentication, accounts, and customer profiles".to_string());

    let app = Router::new()
        .merge(router)
        .nest("/health", health_router(health_state.clone()))
        // OpenAPI / Swagger UI with auto-collected paths
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        // Auth middleware
        .layer(AuthLayer::new(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    health_state.set_ready();

    // Start API server; ConnectInfo is needed for caller IP attribution
    let api_addr = format!("0.0.0.0:{}", config.api_port);
    info!("API server listening on http://{}", api_addr);

    let api_listener = TcpListener::bind(&api_addr).await?;
    let api_task = tokio::spawn(async move {
        axum::serve(
            api_listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    // Start metrics server
    let metrics_addr = format!("0.0.0.0:{}", config.metrics_port);
    info!("Metrics server listening on http://{}/metrics", metrics_addr);

    let metrics_app = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler));

    let metrics_listener = TcpListener::bind(&metrics_addr).await?;
    let metrics_task = tokio::spawn(async move {
        axum::serve(metrics_listener, metrics_app).await.unwrap();
    });

    info!("WebShop API Server started");
    info!("Press Ctrl+C to shutdown");

    // Wait for shutdown
    shutdown_signal().await;
    info!("Shutdown signal received...");

    api_task.abort();
    metrics_task.abort();

    info!("WebShop API Server shutdown complete");
    Ok(())
}

async fn metrics_handler() -> &'static str {
    "# HELP ws_api_up API server is up\n# TYPE ws_api_up gauge\nws_api_up 1\n"
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn ready_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "READY"
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
