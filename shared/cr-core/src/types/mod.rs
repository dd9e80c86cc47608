//! Shared domain types.

pub mod decision;
pub mod ids;
pub mod node;
pub mod rule;

pub use decision::{AccessDecision, Viewer};
pub use ids::{NodeId, ProductId, UserId};
pub use node::{ContentKind, ContentNode};
pub use rule::{MatchMode, MessageVariant, Requirement, ResolvedRestriction, RestrictionRule};
