//! Content Restriction Server
//!
//! HTTP sidecar that answers purchase-gated access checks for a host
//! content platform, backed by `PostgreSQL`.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod restriction;
