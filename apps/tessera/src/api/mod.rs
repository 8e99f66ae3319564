//! # Tessera HTTP API Module
//!
//! This module implements the read-only HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Per-storage instance, concept and triple counts
//! - `GET /storages` - Storage names
//! - `GET /storages/{name}` - Reconstructed storage
//! - `GET /storages/{name}/instances/{label}` - Single-record instance view
//!
//! Auth, rate limit and CORS come from an [`ApiConfig`] resolved once at
//! startup.

mod auth;
mod handlers;
mod middleware;
mod types;

// Re-exports for external use
pub use auth::ApiKey;
pub use handlers::{
    error_status, health_handler, instance_handler, list_storages_handler, status_handler,
    storage_handler,
};
pub use middleware::create_rate_limiter;
pub use types::{
    ConceptJson, HealthResponse, InstanceJson, InstanceResponse, StatusResponse,
    StorageJson, StorageListResponse, StorageResponse, TripleJson,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::get,
};
use crate::config::{ApiConfig, CorsOrigins};
use std::num::NonZeroU32;
use std::sync::Arc;
use tessera_core::{Navigator, RecordSource, TesseraError};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// A navigator over any record source.
pub type SharedNavigator = Navigator<Box<dyn RecordSource>>;

/// Shared server state containing the navigator.
///
/// Reconstruction only reads from the source, so no lock is needed.
#[derive(Clone)]
pub struct AppState {
    pub navigator: Arc<SharedNavigator>,
}

impl AppState {
    /// Create new app state with a navigator.
    #[must_use]
    pub fn new(navigator: SharedNavigator) -> Self {
        Self {
            navigator: Arc::new(navigator),
        }
    }
}

// =============================================================================
// CORS
// =============================================================================

const LOCALHOST_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:8080",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:8080",
];

/// CORS for a read-only API: `GET` only, with `Authorization` allowed so
/// browsers can send the key.
fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allowed: Vec<HeaderValue> = match origins {
        CorsOrigins::Any => return CorsLayer::permissive(),
        CorsOrigins::Localhost => LOCALHOST_ORIGINS
            .into_iter()
            .map(HeaderValue::from_static)
            .collect(),
        CorsOrigins::List(list) => list
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect(),
    };

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET])
        .allow_headers([header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router.
///
/// `/health` sits outside auth and rate limiting. The storage routes get,
/// outer to inner: rate limit, then API key check. Tracing and CORS wrap
/// everything.
pub fn create_router(state: AppState, config: &ApiConfig) -> Router {
    let mut storages = Router::new()
        .route("/status", get(handlers::status_handler))
        .route("/storages", get(handlers::list_storages_handler))
        .route("/storages/{name}", get(handlers::storage_handler))
        .route(
            "/storages/{name}/instances/{label}",
            get(handlers::instance_handler),
        );

    match config.api_key.as_deref().and_then(ApiKey::new) {
        Some(key) => {
            storages = storages.route_layer(axum_middleware::from_fn_with_state(
                key,
                auth::require_api_key,
            ));
        }
        None => tracing::warn!("no API key configured, storage routes are public"),
    }

    match NonZeroU32::new(config.rate_limit) {
        Some(rate) => {
            tracing::info!(rate = rate.get(), "rate limiting enabled");
            storages = storages.route_layer(axum_middleware::from_fn_with_state(
                create_rate_limiter(rate),
                middleware::rate_limit_middleware,
            ));
        }
        None => tracing::info!("rate limiting disabled"),
    }

    if config.cors_origins == CorsOrigins::Any {
        tracing::warn!("CORS allows every origin");
    }

    Router::new()
        .route("/health", get(handlers::health_handler))
        .merge(storages)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.cors_origins)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(
    addr: &str,
    navigator: SharedNavigator,
    config: &ApiConfig,
) -> Result<(), TesseraError> {
    let router = create_router(AppState::new(navigator), config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| TesseraError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Tessera HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| TesseraError::IoError(format!("Server error: {}", e)))
}
