//! Content node types.

use serde::{Deserialize, Serialize};

use super::ids::NodeId;

/// Kind of content a node represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    #[default]
    Post,
    Page,
    Forum,
    Topic,
    Reply,
    /// Any other (custom) content type.
    Other,
}

impl ContentKind {
    /// Map a host post-type name to a kind. Unknown names become [`ContentKind::Other`].
    #[must_use]
    pub fn from_post_type(post_type: &str) -> Self {
        match post_type {
            "post" => Self::Post,
            "page" => Self::Page,
            "forum" => Self::Forum,
            "topic" => Self::Topic,
            "reply" => Self::Reply,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Page => "page",
            Self::Forum => "forum",
            Self::Topic => "topic",
            Self::Reply => "reply",
            Self::Other => "other",
        }
    }
}

/// A node in the host's content hierarchy.
///
/// `parent` is the structural parent: a reply's topic, a topic's forum,
/// a sub-forum's forum or a child page's page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
    pub id: NodeId,
    #[serde(default)]
    pub kind: ContentKind,
    #[serde(default)]
    pub parent: Option<NodeId>,
}

impl ContentNode {
    #[must_use]
    pub const fn new(id: NodeId, kind: ContentKind) -> Self {
        Self {
            id,
            kind,
            parent: None,
        }
    }

    #[must_use]
    pub const fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }
}
