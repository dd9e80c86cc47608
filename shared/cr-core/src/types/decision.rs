//! Viewer identity and access decisions.

use serde::{Deserialize, Serialize};

use super::ids::{NodeId, UserId};

/// Who is looking at the content, as asserted by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    /// `None` for a guest.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Moderator capability: bypasses every restriction.
    #[serde(default)]
    pub can_moderate: bool,
}

impl Viewer {
    #[must_use]
    pub const fn guest() -> Self {
        Self {
            user_id: None,
            can_moderate: false,
        }
    }

    #[must_use]
    pub const fn user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            can_moderate: false,
        }
    }

    #[must_use]
    pub const fn moderator(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            can_moderate: true,
        }
    }
}

/// Result of an access check. Computed per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub granted: bool,
    /// Rendered denial message; present iff access was denied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Node whose rule produced a denial.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted_by: Option<NodeId>,
}

impl AccessDecision {
    #[must_use]
    pub const fn allow() -> Self {
        Self {
            granted: true,
            message: None,
            restricted_by: None,
        }
    }

    #[must_use]
    pub const fn deny(message: String, restricted_by: Option<NodeId>) -> Self {
        Self {
            granted: false,
            message: Some(message),
            restricted_by,
        }
    }

    /// Denial message, or an empty string when granted.
    #[must_use]
    pub fn message_or_empty(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_serialization_omits_empty_fields() {
        let json = serde_json::to_value(AccessDecision::allow()).unwrap();
        assert_eq!(json, serde_json::json!({ "granted": true }));

        let denied = AccessDecision::deny("Buy it first".into(), Some(NodeId(3)));
        let json = serde_json::to_value(&denied).unwrap();
        assert_eq!(json["granted"], false);
        assert_eq!(json["restricted_by"], 3);
        assert_eq!(denied.message_or_empty(), "Buy it first");
    }

    #[test]
    fn test_viewer_defaults_to_guest() {
        let viewer: Viewer = serde_json::from_str("{}").unwrap();
        assert_eq!(viewer, Viewer::guest());
    }
}
