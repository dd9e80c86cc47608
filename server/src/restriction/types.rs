//! Request and response types for the restriction API.

use cr_core::{
    ForumPage, MenuItem, NodeId, RenderTarget, ResolvedRestriction, RestrictionRule, Viewer,
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};

/// Largest id that fits the `BIGINT` columns.
const MAX_ID: u64 = i64::MAX as u64;

/// Check that an id is usable as a database key.
pub fn validate_id(id: u64) -> ApiResult<u64> {
    if id == 0 || id > MAX_ID {
        return Err(ApiError::InvalidId(id.to_string()));
    }
    Ok(id)
}

pub fn validate_node(node: NodeId) -> ApiResult<NodeId> {
    validate_id(node.get()).map(NodeId)
}

/// Parse a node id taken from the URL path.
pub fn parse_node_id(raw: &str) -> ApiResult<NodeId> {
    let id = raw
        .parse::<u64>()
        .map_err(|_| ApiError::InvalidId(raw.to_string()))?;
    validate_node(NodeId(id))
}

/// Restriction lookup result.
#[derive(Debug, Serialize)]
pub struct RestrictionResponse {
    pub node_id: NodeId,
    pub restricted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restriction: Option<ResolvedRestriction>,
}

impl RestrictionResponse {
    #[must_use]
    pub fn new(node_id: NodeId, restriction: Option<ResolvedRestriction>) -> Self {
        Self {
            node_id,
            restricted: restriction.is_some(),
            restriction,
        }
    }
}

/// Access check for one node.
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub viewer: Viewer,
    pub node_id: NodeId,
}

/// Access check against an explicit rule.
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub viewer: Viewer,
    #[serde(default)]
    pub rule: Option<RestrictionRule>,
    /// Node the rule belongs to, reported back on denial.
    #[serde(default)]
    pub node_id: Option<NodeId>,
}

/// Output to pass through the render filter chain.
#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub viewer: Viewer,
    pub target: RenderTarget,
    #[serde(default)]
    pub content: String,
    /// Host's own visibility answer for the target.
    #[serde(default = "default_visible")]
    pub visible: bool,
}

const fn default_visible() -> bool {
    true
}

/// Host feedback text shown on a forum or topic page.
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub viewer: Viewer,
    pub page: ForumPage,
    /// Forum or topic being viewed.
    pub node_id: NodeId,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub text: String,
    pub overridden: bool,
}

/// Navigation menu to filter.
#[derive(Debug, Deserialize)]
pub struct MenuFilterRequest {
    #[serde(default)]
    pub viewer: Viewer,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Serialize)]
pub struct MenuFilterResponse {
    pub items: Vec<MenuItem>,
}
