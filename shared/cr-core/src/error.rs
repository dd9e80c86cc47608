//! Error types for restriction resolution and evaluation.
//!
//! None of these are fatal to a render: every call site degrades to the most
//! restrictive safe answer or to a built-in default.

use std::fmt;

use crate::formatter::TemplateKey;
use crate::types::NodeId;

/// Structural problem found while walking a node's ancestry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityFault {
    /// A node appeared twice in the chain.
    #[error("cycle in ancestor chain: node {node} revisited")]
    Cycle { node: NodeId },

    /// The chain is longer than the configured walk limit.
    #[error("ancestor chain of node {node} exceeds {limit} levels")]
    DepthExceeded { node: NodeId, limit: usize },
}

/// External data source consulted by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collaborator {
    ContentHierarchy,
    RestrictionStore,
    PurchaseHistory,
    ProductCatalog,
}

impl Collaborator {
    /// Stable name used in logs and error payloads.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ContentHierarchy => "content_hierarchy",
            Self::RestrictionStore => "restriction_store",
            Self::PurchaseHistory => "purchase_history",
            Self::ProductCatalog => "product_catalog",
        }
    }
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Restriction errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RestrictionError {
    /// Malformed or cyclic ancestor chain.
    #[error("Data integrity failure: {0}")]
    DataIntegrity(#[from] IntegrityFault),

    /// A collaborator lookup failed.
    #[error("{collaborator} unavailable: {reason}")]
    CollaboratorUnavailable {
        collaborator: Collaborator,
        reason: String,
    },

    /// No message template is configured for a key.
    #[error("No message template configured for {key}")]
    ConfigurationMissing { key: TemplateKey },
}

impl RestrictionError {
    /// Shorthand for [`RestrictionError::CollaboratorUnavailable`].
    pub fn unavailable(collaborator: Collaborator, reason: impl Into<String>) -> Self {
        Self::CollaboratorUnavailable {
            collaborator,
            reason: reason.into(),
        }
    }

    /// Whether this error came from corrupted hierarchy data.
    #[must_use]
    pub const fn is_integrity(&self) -> bool {
        matches!(self, Self::DataIntegrity(_))
    }
}

pub type Result<T> = std::result::Result<T, RestrictionError>;
