//! Host Authentication
//!
//! The sidecar trusts viewer identity asserted by the host, so the host
//! itself must authenticate when a shared token is configured.

mod middleware;

pub use middleware::require_host_token;
