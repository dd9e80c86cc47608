//! In-memory, request-scoped site data.
//!
//! A [`SiteSnapshot`] holds just enough of the host's content tree,
//! restriction metadata, purchase history, catalog and settings to answer
//! every collaborator call for one request. It is built once, read many
//! times and then dropped, so concurrent purchases never change an answer
//! mid-request.

use std::collections::{HashMap, HashSet};

use crate::collaborators::{
    ContentHierarchy, ProductCatalog, PurchaseHistory, RestrictionStore, TemplateStore,
};
use crate::error::{Collaborator, RestrictionError, Result};
use crate::formatter::TemplateKey;
use crate::forum::ForumContext;
use crate::types::{ContentKind, ContentNode, NodeId, ProductId, RestrictionRule, UserId};

/// Upper bound on parent links followed when listing ancestors.
const ANCESTOR_SCAN_LIMIT: usize = 1024;

/// Purchase history as loaded for the request.
#[derive(Debug, Clone)]
enum PurchaseLedger {
    /// Products owned per user.
    Available(HashMap<UserId, HashSet<ProductId>>),
    /// The purchase store could not be read.
    Unavailable(String),
}

impl Default for PurchaseLedger {
    fn default() -> Self {
        Self::Available(HashMap::new())
    }
}

/// Read-only site data for one request.
#[derive(Debug, Clone, Default)]
pub struct SiteSnapshot {
    nodes: HashMap<NodeId, ContentNode>,
    rules: HashMap<NodeId, RestrictionRule>,
    purchases: PurchaseLedger,
    products: HashMap<ProductId, String>,
    templates: HashMap<TemplateKey, String>,
}

impl SiteSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_node(mut self, node: ContentNode) -> Self {
        self.insert_node(node);
        self
    }

    #[must_use]
    pub fn with_rule(mut self, node: NodeId, rule: RestrictionRule) -> Self {
        self.insert_rule(node, rule);
        self
    }

    #[must_use]
    pub fn with_purchase(mut self, user: UserId, product: ProductId) -> Self {
        self.insert_purchase(user, product);
        self
    }

    #[must_use]
    pub fn with_product(mut self, product: ProductId, name: impl Into<String>) -> Self {
        self.insert_product(product, name);
        self
    }

    #[must_use]
    pub fn with_template(mut self, key: TemplateKey, template: impl Into<String>) -> Self {
        self.insert_template(key, template);
        self
    }

    #[must_use]
    pub fn with_purchases_unavailable(mut self, reason: impl Into<String>) -> Self {
        self.mark_purchases_unavailable(reason);
        self
    }

    pub fn insert_node(&mut self, node: ContentNode) {
        self.nodes.insert(node.id, node);
    }

    pub fn insert_rule(&mut self, node: NodeId, rule: RestrictionRule) {
        self.rules.insert(node, rule);
    }

    /// Record a purchase. Ignored once the ledger is marked unavailable.
    pub fn insert_purchase(&mut self, user: UserId, product: ProductId) {
        if let PurchaseLedger::Available(owned) = &mut self.purchases {
            owned.entry(user).or_default().insert(product);
        }
    }

    pub fn insert_product(&mut self, product: ProductId, name: impl Into<String>) {
        self.products.insert(product, name.into());
    }

    pub fn insert_template(&mut self, key: TemplateKey, template: impl Into<String>) {
        self.templates.insert(key, template.into());
    }

    pub fn mark_purchases_unavailable(&mut self, reason: impl Into<String>) {
        self.purchases = PurchaseLedger::Unavailable(reason.into());
    }

    /// Forum context of a forum, topic or reply node.
    #[must_use]
    pub fn forum_context(&self, id: NodeId) -> Option<ForumContext> {
        let node = self.nodes.get(&id)?;

        match node.kind {
            ContentKind::Forum => Some(ForumContext::forum(id)),
            ContentKind::Topic => node.parent.map(|forum| ForumContext::topic(forum, id)),
            ContentKind::Reply => {
                let topic = node.parent?;
                let forum = self.nodes.get(&topic)?.parent?;
                Some(ForumContext::topic(forum, topic))
            }
            _ => None,
        }
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }
}

impl ContentHierarchy for SiteSnapshot {
    fn structural_parent(&self, node: NodeId) -> Result<Option<NodeId>> {
        Ok(self.parent_of(node))
    }

    /// Follows parent links nearest-first. A repeated node is emitted once
    /// and ends the list so the resolver can see the cycle.
    fn ancestors(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([node]);
        let mut current = self.parent_of(node);

        while let Some(id) = current {
            chain.push(id);
            if !seen.insert(id) || chain.len() >= ANCESTOR_SCAN_LIMIT {
                break;
            }
            current = self.parent_of(id);
        }

        Ok(chain)
    }
}

impl RestrictionStore for SiteSnapshot {
    fn own_restriction(&self, node: NodeId) -> Result<Option<RestrictionRule>> {
        Ok(self.rules.get(&node).cloned())
    }
}

impl PurchaseHistory for SiteSnapshot {
    fn has_purchased(&self, user: UserId, product: ProductId) -> Result<bool> {
        match &self.purchases {
            PurchaseLedger::Available(owned) => Ok(owned
                .get(&user)
                .is_some_and(|products| products.contains(&product))),
            PurchaseLedger::Unavailable(reason) => Err(RestrictionError::unavailable(
                Collaborator::PurchaseHistory,
                reason.clone(),
            )),
        }
    }

    fn has_any_purchase(&self, user: UserId) -> Result<bool> {
        match &self.purchases {
            PurchaseLedger::Available(owned) => Ok(owned
                .get(&user)
                .is_some_and(|products| !products.is_empty())),
            PurchaseLedger::Unavailable(reason) => Err(RestrictionError::unavailable(
                Collaborator::PurchaseHistory,
                reason.clone(),
            )),
        }
    }
}

impl ProductCatalog for SiteSnapshot {
    fn product_name(&self, product: ProductId) -> Result<String> {
        self.products.get(&product).cloned().ok_or_else(|| {
            RestrictionError::unavailable(
                Collaborator::ProductCatalog,
                format!("product {product} not loaded"),
            )
        })
    }
}

impl TemplateStore for SiteSnapshot {
    fn message_template(&self, key: TemplateKey) -> Option<String> {
        self.templates.get(&key).cloned()
    }
}
