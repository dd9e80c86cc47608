//! Content Restriction Core
//!
//! Decides whether a viewer may see a piece of content that is gated behind
//! the purchase of one or more products.
//!
//! - [`resolver`]: finds the nearest restriction rule along a node's ancestry
//! - [`evaluator`]: checks a viewer's purchases against a resolved rule
//! - [`formatter`]: renders the denial message from configurable templates
//! - [`service`]: the [`ContentRestriction`] service tying them together
//!
//! Forum gating, the render filter chain and menu filtering are layered on
//! top of the service. All collaborator data is read through the traits in
//! [`collaborators`]; [`SiteSnapshot`] is an in-memory implementation built
//! once per request.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod formatter;
pub mod forum;
pub mod menus;
pub mod pipeline;
pub mod resolver;
pub mod service;
pub mod snapshot;
pub mod types;

pub use collaborators::{
    Collaborators, ContentHierarchy, ProductCatalog, PurchaseHistory, RestrictionStore,
    TemplateStore,
};
pub use config::RestrictionConfig;
pub use error::{Collaborator, IntegrityFault, RestrictionError, Result};
pub use formatter::{MessageFormatter, TemplateKey};
pub use forum::{ForumContext, ForumPage};
pub use menus::MenuItem;
pub use pipeline::{FilterChain, RenderContext, RenderFilter, RenderTarget};
pub use service::ContentRestriction;
pub use snapshot::SiteSnapshot;
pub use types::*;
