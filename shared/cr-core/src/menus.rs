//! Navigation menu filtering.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::service::ContentRestriction;
use crate::types::{NodeId, Viewer};

/// A navigation menu entry as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u64,
    /// Content node the item links to; `None` for custom links.
    #[serde(default)]
    pub object_id: Option<NodeId>,
    /// Parent menu item, `None` at the top level.
    #[serde(default)]
    pub parent_item: Option<u64>,
    #[serde(default)]
    pub title: String,
}

impl ContentRestriction<'_> {
    /// Drop menu items the viewer cannot access, with their sub-items.
    ///
    /// Returns `items` untouched unless `hide_menu_items` is enabled.
    #[must_use]
    pub fn filter_menu_items(&self, viewer: Viewer, items: Vec<MenuItem>) -> Vec<MenuItem> {
        if !self.config().hide_menu_items || viewer.can_moderate {
            return items;
        }

        let denied: HashSet<u64> = items
            .iter()
            .filter(|item| {
                item.object_id
                    .is_some_and(|node| !self.check_node(viewer, node).granted)
            })
            .map(|item| item.id)
            .collect();

        if denied.is_empty() {
            return items;
        }

        let parents: HashMap<u64, u64> = items
            .iter()
            .filter_map(|item| item.parent_item.map(|parent| (item.id, parent)))
            .collect();

        let before = items.len();
        let kept: Vec<MenuItem> = items
            .into_iter()
            .filter(|item| !is_hidden(item.id, &denied, &parents))
            .collect();

        debug!(removed = before - kept.len(), "Filtered menu items");
        kept
    }
}

/// Whether `id` or any of its parent items is denied.
fn is_hidden(id: u64, denied: &HashSet<u64>, parents: &HashMap<u64, u64>) -> bool {
    let mut seen = HashSet::new();
    let mut current = Some(id);

    while let Some(item) = current {
        if denied.contains(&item) {
            return true;
        }
        if !seen.insert(item) {
            return false;
        }
        current = parents.get(&item).copied();
    }

    false
}
