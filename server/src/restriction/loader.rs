//! Per-request snapshot loading.
//!
//! Hierarchy and rule queries are required: if they fail the caller cannot
//! tell whether content is restricted. Purchases, product names and
//! templates degrade instead: an unreadable purchase history marks the
//! ledger unavailable (every purchase check then fails closed), missing
//! names fall back to ids and missing templates to the built-in text.

use cr_core::{
    ContentKind, ContentNode, MatchMode, MessageVariant, NodeId, ProductId, RestrictionConfig,
    RestrictionRule, SiteSnapshot, TemplateKey, UserId, Viewer,
};
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::db::{self, NodeRow, RestrictionRow};

/// Which parts of the site a request needs.
#[derive(Debug, Clone, Default)]
pub struct SnapshotQuery {
    nodes: Vec<NodeId>,
    user: Option<UserId>,
    products: Vec<ProductId>,
}

impl SnapshotQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn node(mut self, node: NodeId) -> Self {
        self.nodes.push(node);
        self
    }

    #[must_use]
    pub fn nodes(mut self, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    /// Load the viewer's purchases. Moderators never need them.
    #[must_use]
    pub fn viewer(mut self, viewer: &Viewer) -> Self {
        if !viewer.can_moderate {
            self.user = viewer.user_id;
        }
        self
    }

    /// Load names for products not reachable through a node's rule.
    #[must_use]
    pub fn products(mut self, products: impl IntoIterator<Item = ProductId>) -> Self {
        self.products.extend(products);
        self
    }

    /// Build the snapshot.
    pub async fn load(
        &self,
        pool: &PgPool,
        config: &RestrictionConfig,
    ) -> Result<SiteSnapshot, sqlx::Error> {
        let mut snapshot = SiteSnapshot::new();
        let mut product_ids: Vec<i64> = self.products.iter().map(|p| to_db(p.get())).collect();

        if !self.nodes.is_empty() {
            let ids: Vec<i64> = self.nodes.iter().map(|n| to_db(n.get())).collect();
            // One link past the cap so the resolver can still see the overrun.
            let depth =
                i32::try_from(config.max_ancestor_depth.saturating_add(2)).unwrap_or(i32::MAX);

            let rows = db::load_lineage(pool, &ids, depth).await?;
            let lineage: Vec<i64> = rows.iter().map(|row| row.id).collect();
            for row in rows {
                if let Some(node) = node_from_row(&row) {
                    snapshot.insert_node(node);
                }
            }

            for row in db::load_restrictions(pool, &lineage).await? {
                let (Some(node), Some(rule)) = (from_db(row.node_id), rule_from_row(&row)) else {
                    continue;
                };
                product_ids.extend(rule.product_ids().iter().map(|p| to_db(p.get())));
                snapshot.insert_rule(NodeId(node), rule);
            }

            debug!(
                requested = ids.len(),
                lineage = lineage.len(),
                "Loaded content lineage"
            );
        }

        if let Some(user) = self.user {
            match db::load_purchases(pool, to_db(user.get())).await {
                Ok(products) => {
                    for product in products.into_iter().filter_map(from_db) {
                        snapshot.insert_purchase(user, ProductId(product));
                    }
                }
                Err(e) => {
                    warn!(user = %user, error = %e, "Purchase history unavailable");
                    snapshot.mark_purchases_unavailable(e.to_string());
                }
            }
        }

        product_ids.sort_unstable();
        product_ids.dedup();
        if !product_ids.is_empty() {
            match db::load_products(pool, &product_ids).await {
                Ok(rows) => {
                    for row in rows {
                        if let Some(id) = from_db(row.id) {
                            snapshot.insert_product(ProductId(id), row.name);
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Product names unavailable, using ids"),
            }
        }

        let keys: Vec<&str> = TemplateKey::ALL.iter().map(TemplateKey::setting_key).collect();
        match db::load_settings(pool, &keys).await {
            Ok(rows) => {
                for row in rows {
                    if let Ok(key) = row.key.parse::<TemplateKey>() {
                        snapshot.insert_template(key, row.value);
                    }
                }
            }
            Err(e) => warn!(error = %e, "Message templates unavailable, using defaults"),
        }

        Ok(snapshot)
    }
}

/// Validated ids always fit; anything else saturates rather than wrapping.
fn to_db(id: u64) -> i64 {
    i64::try_from(id).unwrap_or(i64::MAX)
}

fn from_db(id: i64) -> Option<u64> {
    u64::try_from(id).ok().filter(|id| *id > 0)
}

fn node_from_row(row: &NodeRow) -> Option<ContentNode> {
    let id = NodeId(from_db(row.id)?);
    let node = ContentNode::new(id, ContentKind::from_post_type(&row.kind));

    Some(match row.parent_id.and_then(from_db) {
        Some(parent) => node.with_parent(NodeId(parent)),
        None => node,
    })
}

/// Convert a stored rule. Rules with no usable product and no
/// any-purchase flag carry no restriction.
fn rule_from_row(row: &RestrictionRow) -> Option<RestrictionRule> {
    let mut rule = if row.any_purchase {
        RestrictionRule::any_purchase()
    } else {
        RestrictionRule::products(
            row.product_ids
                .iter()
                .copied()
                .filter_map(from_db)
                .map(ProductId),
        )?
    };

    if let Some(raw) = row.match_mode.as_deref() {
        match raw.parse::<MatchMode>() {
            Ok(mode) => rule = rule.with_match_mode(mode),
            Err(e) => warn!(node_id = row.node_id, error = %e, "Ignoring stored match mode"),
        }
    }

    if let Some(raw) = row.message_variant.as_deref() {
        match raw.parse::<MessageVariant>() {
            Ok(variant) => rule = rule.with_message_variant(variant),
            Err(e) => warn!(node_id = row.node_id, error = %e, "Ignoring stored message variant"),
        }
    }

    Some(rule)
}
