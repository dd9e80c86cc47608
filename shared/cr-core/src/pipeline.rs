//! Render filter chain.
//!
//! The host hands each piece of output it is about to render to a
//! [`FilterChain`] as a [`RenderContext`]. Every filter in the chain sees
//! the context in order and may rewrite the content or hide it. Filters
//! skip targets they do not handle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::forum::ForumContext;
use crate::service::ContentRestriction;
use crate::types::{AccessDecision, NodeId, Viewer};

/// What is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderTarget {
    /// Body of a post, page or other content node.
    Node { node_id: NodeId },
    /// Topic list of a single forum.
    ForumListing { forum_id: NodeId },
    /// Body of a reply in a topic.
    Reply { forum_id: NodeId, topic_id: NodeId },
    /// New-topic form of a forum.
    TopicForm {
        forum_id: NodeId,
        #[serde(default)]
        can_publish: bool,
    },
    /// Reply form of a topic.
    ReplyForm {
        forum_id: NodeId,
        topic_id: NodeId,
        #[serde(default)]
        can_publish: bool,
    },
}

impl RenderTarget {
    /// Node whose restriction governs the target.
    #[must_use]
    pub const fn governing_node(&self) -> NodeId {
        match *self {
            Self::Node { node_id } => node_id,
            Self::ForumListing { forum_id } | Self::TopicForm { forum_id, .. } => forum_id,
            Self::Reply { topic_id, .. } | Self::ReplyForm { topic_id, .. } => topic_id,
        }
    }

    /// Every node the target refers to.
    #[must_use]
    pub fn node_ids(&self) -> Vec<NodeId> {
        match *self {
            Self::Node { node_id } => vec![node_id],
            Self::ForumListing { forum_id } | Self::TopicForm { forum_id, .. } => vec![forum_id],
            Self::Reply { forum_id, topic_id } | Self::ReplyForm { forum_id, topic_id, .. } => {
                vec![forum_id, topic_id]
            }
        }
    }

    /// Whether the target carries a body that is replaced on denial, as
    /// opposed to being hidden.
    #[must_use]
    pub const fn carries_content(&self) -> bool {
        matches!(self, Self::Node { .. } | Self::Reply { .. })
    }
}

/// Output passed through the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderContext {
    pub viewer: Viewer,
    pub target: RenderTarget,
    /// Content to render; replaced by the denial message when gated.
    pub content: String,
    /// Whether the host should render the target at all.
    pub visible: bool,
    /// Last access decision made by a content gate.
    pub decision: Option<AccessDecision>,
}

impl RenderContext {
    pub fn new(viewer: Viewer, target: RenderTarget, content: impl Into<String>) -> Self {
        Self {
            viewer,
            target,
            content: content.into(),
            visible: true,
            decision: None,
        }
    }
}

/// One step of the chain.
pub trait RenderFilter: Send + Sync {
    /// Stable name used to inspect a chain.
    fn name(&self) -> &'static str;

    fn apply(&self, ctx: &mut RenderContext, service: &ContentRestriction<'_>);
}

/// Replaces restricted node content with the denial message.
pub struct ContentGate;

impl RenderFilter for ContentGate {
    fn name(&self) -> &'static str {
        "content_gate"
    }

    fn apply(&self, ctx: &mut RenderContext, service: &ContentRestriction<'_>) {
        let RenderTarget::Node { node_id } = ctx.target else {
            return;
        };

        let decision = service.check_node(ctx.viewer, node_id);
        if !decision.granted {
            ctx.content = decision.message_or_empty().to_string();
        }
        ctx.decision = Some(decision);
    }
}

/// Replaces restricted reply bodies with the denial message.
pub struct ReplyContentGate;

impl RenderFilter for ReplyContentGate {
    fn name(&self) -> &'static str {
        "reply_content_gate"
    }

    fn apply(&self, ctx: &mut RenderContext, service: &ContentRestriction<'_>) {
        let RenderTarget::Reply { forum_id, topic_id } = ctx.target else {
            return;
        };

        let decision = service.forum_access(ctx.viewer, &ForumContext::topic(forum_id, topic_id));
        if !decision.granted {
            ctx.content = decision.message_or_empty().to_string();
        }
        ctx.decision = Some(decision);
    }
}

/// Hides the topic list of a restricted forum.
pub struct TopicListGate;

impl RenderFilter for TopicListGate {
    fn name(&self) -> &'static str {
        "topic_list_gate"
    }

    fn apply(&self, ctx: &mut RenderContext, service: &ContentRestriction<'_>) {
        if let RenderTarget::ForumListing { forum_id } = ctx.target {
            ctx.visible = service.filter_topic_list(ctx.viewer, forum_id, ctx.visible);
        }
    }
}

/// Hides the new-topic form of a restricted forum.
pub struct TopicFormGate;

impl RenderFilter for TopicFormGate {
    fn name(&self) -> &'static str {
        "topic_form_gate"
    }

    fn apply(&self, ctx: &mut RenderContext, service: &ContentRestriction<'_>) {
        if let RenderTarget::TopicForm {
            forum_id,
            can_publish,
        } = ctx.target
        {
            ctx.visible =
                service.can_access_topic_form(ctx.viewer, forum_id, can_publish, ctx.visible);
        }
    }
}

/// Hides the reply form of a restricted topic.
pub struct ReplyFormGate;

impl RenderFilter for ReplyFormGate {
    fn name(&self) -> &'static str {
        "reply_form_gate"
    }

    fn apply(&self, ctx: &mut RenderContext, service: &ContentRestriction<'_>) {
        if let RenderTarget::ReplyForm {
            forum_id,
            topic_id,
            can_publish,
        } = ctx.target
        {
            ctx.visible = service.can_access_reply_form(
                ctx.viewer,
                &ForumContext::topic(forum_id, topic_id),
                can_publish,
                ctx.visible,
            );
        }
    }
}

/// Ordered list of render filters.
pub struct FilterChain {
    filters: Vec<Box<dyn RenderFilter>>,
}

impl FilterChain {
    /// An empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// The built-in gates in their default order.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with(ContentGate)
            .with(ReplyContentGate)
            .with(TopicListGate)
            .with(TopicFormGate)
            .with(ReplyFormGate)
    }

    /// Append a filter.
    #[must_use]
    pub fn with(mut self, filter: impl RenderFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|filter| filter.name()).collect()
    }

    /// Pass `ctx` through every filter in order.
    #[must_use]
    pub fn run(&self, mut ctx: RenderContext, service: &ContentRestriction<'_>) -> RenderContext {
        for filter in &self.filters {
            filter.apply(&mut ctx, service);
        }
        ctx
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.names())
            .finish()
    }
}
