//! Forum gating.
//!
//! A forum, a topic in it and the replies in the topic share one
//! restriction: the topic's own rule if it has one, otherwise the nearest
//! rule on the forum or its parent forums.

use serde::{Deserialize, Serialize};

use crate::service::ContentRestriction;
use crate::types::{AccessDecision, NodeId, Viewer};

/// Feedback shown on a restricted topic page in place of the reply notice.
pub const TOPIC_RESTRICTED_FEEDBACK: &str = "Topic creation is restricted to buyers.";

/// Feedback shown on a restricted forum page in place of the empty notice.
pub const FORUM_RESTRICTED_FEEDBACK: &str = "This forum is restricted to buyers.";

/// Feedback shown on a restricted forum page in place of the new-topic notice.
pub const TOPIC_CREATION_FEEDBACK: &str = "Only buyers can create topics.";

/// The forum (and optionally topic) a page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumContext {
    pub forum_id: NodeId,
    #[serde(default)]
    pub topic_id: Option<NodeId>,
}

impl ForumContext {
    #[must_use]
    pub const fn forum(forum_id: NodeId) -> Self {
        Self {
            forum_id,
            topic_id: None,
        }
    }

    #[must_use]
    pub const fn topic(forum_id: NodeId, topic_id: NodeId) -> Self {
        Self {
            forum_id,
            topic_id: Some(topic_id),
        }
    }

    /// Node whose restriction applies: the topic if present, else the forum.
    #[must_use]
    pub fn governing_node(&self) -> NodeId {
        self.topic_id.unwrap_or(self.forum_id)
    }
}

/// Kind of forum page being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForumPage {
    Topic,
    Forum,
}

impl ContentRestriction<'_> {
    /// Access decision for a forum context.
    #[must_use]
    pub fn forum_access(&self, viewer: Viewer, ctx: &ForumContext) -> AccessDecision {
        self.check_node(viewer, ctx.governing_node())
    }

    #[must_use]
    pub fn can_view_forum(&self, viewer: Viewer, ctx: &ForumContext) -> bool {
        self.forum_access(viewer, ctx).granted
    }

    /// Whether a forum's topic list should be shown. `has_topics` is the
    /// host's own answer and is only ever turned off.
    #[must_use]
    pub fn filter_topic_list(&self, viewer: Viewer, forum_id: NodeId, has_topics: bool) -> bool {
        has_topics && self.check_node(viewer, forum_id).granted
    }

    /// Reply body, or the denial message if the viewer may not read it.
    #[must_use]
    pub fn filter_reply_content(
        &self,
        viewer: Viewer,
        ctx: &ForumContext,
        content: &str,
    ) -> String {
        let decision = self.forum_access(viewer, ctx);
        if decision.granted {
            content.to_string()
        } else {
            decision.message.unwrap_or_default()
        }
    }

    /// Whether the new-topic form is shown in a forum.
    ///
    /// Moderators and viewers who cannot publish topics keep the host's
    /// `current` answer.
    #[must_use]
    pub fn can_access_topic_form(
        &self,
        viewer: Viewer,
        forum_id: NodeId,
        can_publish: bool,
        current: bool,
    ) -> bool {
        if viewer.can_moderate || !can_publish {
            return current;
        }
        self.check_node(viewer, forum_id).granted
    }

    /// Whether the reply form is shown in a topic.
    #[must_use]
    pub fn can_access_reply_form(
        &self,
        viewer: Viewer,
        ctx: &ForumContext,
        can_publish: bool,
        current: bool,
    ) -> bool {
        if viewer.can_moderate || !can_publish {
            return current;
        }
        self.can_view_forum(viewer, ctx)
    }

    /// Replacement for a host feedback string on a page the viewer cannot
    /// see, or `None` to keep the host's text.
    #[must_use]
    pub fn feedback_override(
        &self,
        viewer: Viewer,
        page: ForumPage,
        ctx: &ForumContext,
        text: &str,
    ) -> Option<&'static str> {
        let replacement = match (page, text) {
            (ForumPage::Topic, "You cannot reply to this topic.") => TOPIC_RESTRICTED_FEEDBACK,
            (ForumPage::Forum, "Oh bother! No topics were found here!") => {
                FORUM_RESTRICTED_FEEDBACK
            }
            (
                ForumPage::Forum,
                "You cannot create new topics at this time." | "You cannot create new topics.",
            ) => TOPIC_CREATION_FEEDBACK,
            _ => return None,
        };

        (!self.can_view_forum(viewer, ctx)).then_some(replacement)
    }
}
