//! API Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors returned by the restriction API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-range identifier.
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// Missing or wrong host token.
    #[error("Missing or invalid host token")]
    Unauthorized,

    /// Restriction state could not be read.
    #[error("Restriction data is temporarily unavailable")]
    Unavailable,

    /// Database error.
    #[error("Database error")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for ApiError {
    /// Connection-level failures are reported as unavailable, everything
    /// else as a database error.
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => Self::Unavailable,
            other => Self::Database(other),
        }
    }
}

/// Error response body for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

impl ApiError {
    /// Status code and machine-readable code for this error.
    #[must_use]
    pub const fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidId(_) => (StatusCode::BAD_REQUEST, "invalid_id"),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if let Self::Database(ref e) = self {
            error!(error = %e, "Database error in restriction API");
        }

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type for restriction handlers.
pub type ApiResult<T> = Result<T, ApiError>;
