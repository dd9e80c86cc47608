//! API Router and Application State
//!
//! Central routing configuration and shared state.

use axum::{extract::State, middleware::from_fn_with_state, routing::get, Json, Router};
use cr_core::FilterChain;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::{auth, config::Config, restriction};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Server configuration
    pub config: Arc<Config>,
    /// Render filters applied by `/api/render`
    pub filters: Arc<FilterChain>,
}

impl AppState {
    /// Create new application state with the standard filter chain.
    #[must_use]
    pub fn new(db: PgPool, config: Config) -> Self {
        Self::with_filters(db, config, FilterChain::standard())
    }

    /// Create new application state with a custom filter chain.
    #[must_use]
    pub fn with_filters(db: PgPool, config: Config, filters: FilterChain) -> Self {
        Self {
            db,
            config: Arc::new(config),
            filters: Arc::new(filters),
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    // Host-authenticated restriction routes
    let api_routes = Router::new()
        .nest("/api", restriction::router())
        .layer(from_fn_with_state(state.clone(), auth::require_host_token));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .merge(api_routes)
        // Middleware
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Server version
    version: &'static str,
    /// Whether the host must present a token
    host_auth: bool,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        host_auth: state.config.requires_host_token(),
    })
}
