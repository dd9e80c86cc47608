//! Restriction settings.

use serde::{Deserialize, Serialize};

use crate::types::MatchMode;

/// Default cap on how far the resolver walks up a hierarchy.
pub const DEFAULT_MAX_ANCESTOR_DEPTH: usize = 64;

/// Site-level restriction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestrictionConfig {
    /// Hide navigation menu items the viewer cannot access.
    pub hide_menu_items: bool,

    /// Maximum number of nodes walked above the queried node.
    pub max_ancestor_depth: usize,

    /// Match mode for rules that do not set one.
    pub default_match_mode: MatchMode,
}

impl Default for RestrictionConfig {
    fn default() -> Self {
        Self {
            hide_menu_items: false,
            max_ancestor_depth: DEFAULT_MAX_ANCESTOR_DEPTH,
            default_match_mode: MatchMode::AnyOf,
        }
    }
}
