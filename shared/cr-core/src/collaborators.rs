//! Read-only interfaces to the host platform.
//!
//! The core never owns content, purchases or settings; it reads them
//! through these traits. Lookups that can fail return
//! [`RestrictionError::CollaboratorUnavailable`](crate::RestrictionError).

use crate::error::Result;
use crate::formatter::TemplateKey;
use crate::types::{NodeId, ProductId, RestrictionRule, UserId};

/// Content hierarchy store.
pub trait ContentHierarchy {
    /// Structural parent of a node: a reply's topic, a topic's forum, a
    /// child page's parent. `None` for a root or unknown node.
    fn structural_parent(&self, node: NodeId) -> Result<Option<NodeId>>;

    /// Ancestors of a node ordered nearest-first (immediate parent first,
    /// root last). The node itself is not included.
    fn ancestors(&self, node: NodeId) -> Result<Vec<NodeId>>;
}

/// Per-node restriction metadata.
pub trait RestrictionStore {
    /// Rule attached directly to `node`, if any.
    fn own_restriction(&self, node: NodeId) -> Result<Option<RestrictionRule>>;
}

/// Purchase-history store.
pub trait PurchaseHistory {
    fn has_purchased(&self, user: UserId, product: ProductId) -> Result<bool>;

    /// Whether the user has completed at least one purchase of anything.
    fn has_any_purchase(&self, user: UserId) -> Result<bool>;
}

/// Product catalog.
pub trait ProductCatalog {
    /// Human-readable product name (unescaped, as stored).
    fn product_name(&self, product: ProductId) -> Result<String>;
}

/// Settings store for message templates.
pub trait TemplateStore {
    /// Configured template for `key`, or `None` if unset.
    fn message_template(&self, key: TemplateKey) -> Option<String>;
}

/// Every collaborator the service reads from.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub hierarchy: &'a dyn ContentHierarchy,
    pub restrictions: &'a dyn RestrictionStore,
    pub purchases: &'a dyn PurchaseHistory,
    pub catalog: &'a dyn ProductCatalog,
    pub templates: &'a dyn TemplateStore,
}

impl<'a> Collaborators<'a> {
    /// Use one value for every collaborator role.
    pub fn from_site<S>(site: &'a S) -> Self
    where
        S: ContentHierarchy + RestrictionStore + PurchaseHistory + ProductCatalog + TemplateStore,
    {
        Self {
            hierarchy: site,
            restrictions: site,
            purchases: site,
            catalog: site,
            templates: site,
        }
    }
}
