//! Router configuration for the restriction API.

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use crate::api::AppState;

/// Router for restriction checks (mounted at /api).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/nodes/{node_id}/restriction", get(handlers::get_restriction))
        .route("/access/check", post(handlers::check_access))
        .route("/access/evaluate", post(handlers::evaluate_access))
        .route("/render", post(handlers::render))
        .route("/forum/feedback", post(handlers::forum_feedback))
        .route("/menus/filter", post(handlers::filter_menu))
}
