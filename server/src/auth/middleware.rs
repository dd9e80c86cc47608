//! Authentication Middleware

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::api::AppState;
use crate::restriction::ApiError;

/// Middleware to require the host API token.
///
/// Passes every request through when no token is configured. Otherwise
/// expects `Authorization: Bearer <token>`.
///
/// # Usage
///
/// ```ignore
/// Router::new()
///     .nest("/api", restriction::router())
///     .layer(axum::middleware::from_fn_with_state(state, require_host_token))
/// ```
pub async fn require_host_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config.host_api_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    if !tokens_match(presented, expected) {
        warn!(path = %request.uri().path(), "Rejected request with invalid host token");
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Compare tokens by digest so timing does not depend on where they differ.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    presented
        .iter()
        .zip(expected.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
