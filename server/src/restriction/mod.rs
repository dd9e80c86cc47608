//! Content restriction API.
//!
//! Exposes the core service to the host over JSON:
//! - Restriction lookup and access checks for content nodes
//! - Access evaluation against host-supplied rules
//! - The render filter chain, forum feedback overrides and menu filtering
//!
//! Each request is answered from a snapshot loaded for that request alone.

pub mod error;
pub mod handlers;
pub mod loader;
pub mod router;
pub mod types;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use loader::SnapshotQuery;
pub use router::router;
pub use types::*;
