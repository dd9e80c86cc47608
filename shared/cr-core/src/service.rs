//! The content restriction service.
//!
//! [`ContentRestriction`] ties the resolver, evaluator and formatter to one
//! set of collaborators and settings. It is cheap to build and is meant to
//! live for a single request.

use tracing::{debug, warn};

use crate::collaborators::Collaborators;
use crate::config::RestrictionConfig;
use crate::evaluator::AccessEvaluator;
use crate::formatter::{MessageFormatter, TemplateKey};
use crate::resolver::RestrictionResolver;
use crate::types::{AccessDecision, NodeId, ResolvedRestriction, RestrictionRule, Viewer};
use crate::Result;

/// Answers "is this restricted" and "may this viewer see it".
#[derive(Clone, Copy)]
pub struct ContentRestriction<'a> {
    collaborators: Collaborators<'a>,
    config: &'a RestrictionConfig,
}

impl<'a> ContentRestriction<'a> {
    pub fn new(collaborators: Collaborators<'a>, config: &'a RestrictionConfig) -> Self {
        Self {
            collaborators,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &RestrictionConfig {
        self.config
    }

    #[must_use]
    pub fn formatter(&self) -> MessageFormatter<'a> {
        MessageFormatter::new(self.collaborators.templates, self.collaborators.catalog)
    }

    fn resolver(&self) -> RestrictionResolver<'a> {
        RestrictionResolver::new(
            self.collaborators.hierarchy,
            self.collaborators.restrictions,
            self.config.max_ancestor_depth,
        )
    }

    fn evaluator(&self) -> AccessEvaluator<'a> {
        AccessEvaluator::new(
            self.collaborators.purchases,
            self.formatter(),
            self.config.default_match_mode,
        )
    }

    /// Restriction governing `node`, inherited or its own.
    ///
    /// Hierarchy faults end the walk with whatever was found before them.
    pub fn is_restricted(&self, node: NodeId) -> Result<Option<ResolvedRestriction>> {
        self.resolver().resolve(node)
    }

    /// Like [`is_restricted`](Self::is_restricted) but reports hierarchy
    /// faults to the caller.
    pub fn is_restricted_strict(&self, node: NodeId) -> Result<Option<ResolvedRestriction>> {
        self.resolver().resolve_strict(node)
    }

    /// Decide access under an explicit rule.
    #[must_use]
    pub fn user_can_access(
        &self,
        viewer: Viewer,
        rule: Option<&RestrictionRule>,
        node: Option<NodeId>,
    ) -> AccessDecision {
        if viewer.can_moderate {
            return AccessDecision::allow();
        }
        self.evaluator().evaluate_rule(viewer.user_id, rule, node)
    }

    /// Decide access under an already resolved restriction.
    #[must_use]
    pub fn evaluate(
        &self,
        viewer: Viewer,
        restriction: Option<&ResolvedRestriction>,
    ) -> AccessDecision {
        if viewer.can_moderate {
            return AccessDecision::allow();
        }
        self.evaluator().evaluate(viewer.user_id, restriction)
    }

    /// Resolve and evaluate in one step.
    ///
    /// When the restriction state cannot be read the viewer is denied with
    /// the unavailable message.
    #[must_use]
    pub fn check_node(&self, viewer: Viewer, node: NodeId) -> AccessDecision {
        if viewer.can_moderate {
            return AccessDecision::allow();
        }

        match self.is_restricted(node) {
            Ok(restriction) => {
                if let Some(found) = &restriction {
                    debug!(
                        node = %node,
                        source = %found.source,
                        distance = found.distance,
                        "Node is restricted"
                    );
                }
                self.evaluate(viewer, restriction.as_ref())
            }
            Err(e) => {
                warn!(node = %node, error = %e, "Restriction lookup failed, denying access");
                self.unavailable(node)
            }
        }
    }

    /// Denial used when restriction state is unknown.
    #[must_use]
    pub fn unavailable(&self, node: NodeId) -> AccessDecision {
        let message = self.formatter().format(TemplateKey::Unavailable, &[]);
        AccessDecision::deny(message, Some(node))
    }
}
