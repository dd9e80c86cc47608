//! Restriction resolution.
//!
//! Finds the rule that governs a node. Resolution order:
//! 1. The node's own rule
//! 2. Its structural parent's rule (reply → topic, topic → forum)
//! 3. Each ancestor of the structural parent, nearest first
//!
//! The first non-empty rule wins; rules further out are never combined
//! with it.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::collaborators::{ContentHierarchy, RestrictionStore};
use crate::error::{IntegrityFault, RestrictionError, Result};
use crate::types::{NodeId, ResolvedRestriction};

/// Walks a node's ancestry looking for the nearest restriction.
#[derive(Clone, Copy)]
pub struct RestrictionResolver<'a> {
    hierarchy: &'a dyn ContentHierarchy,
    restrictions: &'a dyn RestrictionStore,
    max_depth: usize,
}

impl<'a> RestrictionResolver<'a> {
    /// `max_depth` is raised to 1 so the structural parent is always reached.
    pub fn new(
        hierarchy: &'a dyn ContentHierarchy,
        restrictions: &'a dyn RestrictionStore,
        max_depth: usize,
    ) -> Self {
        Self {
            hierarchy,
            restrictions,
            max_depth: max_depth.max(1),
        }
    }

    /// Resolve the restriction governing `node`.
    ///
    /// A cyclic or over-deep hierarchy is logged and answered with `None`:
    /// nothing was found before the fault, and the remainder of the chain
    /// cannot be trusted. Collaborator failures are returned.
    pub fn resolve(&self, node: NodeId) -> Result<Option<ResolvedRestriction>> {
        match self.resolve_strict(node) {
            Err(RestrictionError::DataIntegrity(fault)) => {
                warn!(
                    node = %node,
                    error = %fault,
                    "Ancestor walk aborted, no further restriction applied"
                );
                Ok(None)
            }
            other => other,
        }
    }

    /// Like [`resolve`](Self::resolve) but returns integrity faults.
    pub fn resolve_strict(&self, node: NodeId) -> Result<Option<ResolvedRestriction>> {
        if let Some(found) = self.rule_at(node, 0)? {
            return Ok(Some(found));
        }

        let Some(parent) = self.hierarchy.structural_parent(node)? else {
            return Ok(None);
        };

        let mut walk = Walk::new(node, self.max_depth);

        let distance = walk.visit(parent)?;
        if let Some(found) = self.rule_at(parent, distance)? {
            return Ok(Some(found));
        }

        for ancestor in self.hierarchy.ancestors(parent)? {
            let distance = walk.visit(ancestor)?;
            if let Some(found) = self.rule_at(ancestor, distance)? {
                return Ok(Some(found));
            }
        }

        Ok(None)
    }

    fn rule_at(&self, node: NodeId, distance: usize) -> Result<Option<ResolvedRestriction>> {
        let resolved = self
            .restrictions
            .own_restriction(node)?
            .filter(|rule| !rule.is_empty())
            .map(|rule| ResolvedRestriction {
                rule,
                source: node,
                distance,
            });

        if let Some(ref found) = resolved {
            debug!(source = %found.source, distance, "Restriction found");
        }

        Ok(resolved)
    }
}

/// Visited-set and depth bookkeeping for one walk.
struct Walk {
    origin: NodeId,
    visited: HashSet<NodeId>,
    limit: usize,
}

impl Walk {
    fn new(origin: NodeId, limit: usize) -> Self {
        Self {
            origin,
            visited: HashSet::from([origin]),
            limit,
        }
    }

    /// Record a step and return its distance from the origin.
    fn visit(&mut self, node: NodeId) -> std::result::Result<usize, IntegrityFault> {
        if !self.visited.insert(node) {
            return Err(IntegrityFault::Cycle { node });
        }

        let distance = self.visited.len() - 1;
        if distance > self.limit {
            return Err(IntegrityFault::DepthExceeded {
                node: self.origin,
                limit: self.limit,
            });
        }

        Ok(distance)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashMap;

    use super::*;
    use crate::error::Collaborator;
    use crate::types::{ProductId, RestrictionRule};

    /// Hierarchy whose ancestor lists are given verbatim, so tests can feed
    /// the resolver chains the snapshot would never produce.
    #[derive(Default)]
    struct FakeSite {
        parents: HashMap<NodeId, NodeId>,
        ancestors: HashMap<NodeId, Vec<NodeId>>,
        rules: HashMap<NodeId, RestrictionRule>,
        hierarchy_down: bool,
        rule_lookups: Cell<usize>,
    }

    impl FakeSite {
        fn chain(mut self, node: u64, parent: u64, ancestors: &[u64]) -> Self {
            self.parents.insert(NodeId(node), NodeId(parent));
            self.ancestors.insert(
                NodeId(parent),
                ancestors.iter().copied().map(NodeId).collect(),
            );
            self
        }

        fn rule(mut self, node: u64, product: u64) -> Self {
            self.rules.insert(
                NodeId(node),
                RestrictionRule::products([ProductId(product)]).unwrap(),
            );
            self
        }
    }

    impl ContentHierarchy for FakeSite {
        fn structural_parent(&self, node: NodeId) -> Result<Option<NodeId>> {
            if self.hierarchy_down {
                return Err(RestrictionError::unavailable(
                    Collaborator::ContentHierarchy,
                    "timeout",
                ));
            }
            Ok(self.parents.get(&node).copied())
        }

        fn ancestors(&self, node: NodeId) -> Result<Vec<NodeId>> {
            Ok(self.ancestors.get(&node).cloned().unwrap_or_default())
        }
    }

    impl RestrictionStore for FakeSite {
        fn own_restriction(&self, node: NodeId) -> Result<Option<RestrictionRule>> {
            self.rule_lookups.set(self.rule_lookups.get() + 1);
            Ok(self.rules.get(&node).cloned())
        }
    }

    fn resolver(site: &FakeSite, max_depth: usize) -> RestrictionResolver<'_> {
        RestrictionResolver::new(site, site, max_depth)
    }

    #[test]
    fn test_unrestricted_root_resolves_to_none() {
        let site = FakeSite::default();
        assert_eq!(resolver(&site, 64).resolve(NodeId(1)).unwrap(), None);
    }

    #[test]
    fn test_own_rule_wins_without_walking() {
        let site = FakeSite::default().chain(10, 5, &[1]).rule(10, 100).rule(5, 200);

        let found = resolver(&site, 64).resolve(NodeId(10)).unwrap().unwrap();
        assert_eq!(found.source, NodeId(10));
        assert_eq!(found.distance, 0);
        assert_eq!(found.rule.product_ids(), &[ProductId(100)]);
        assert_eq!(site.rule_lookups.get(), 1);
    }

    #[test]
    fn test_reply_resolves_through_topic() {
        // reply 30 → topic 20 → forum 10
        let site = FakeSite::default().chain(30, 20, &[10]).rule(20, 7);

        let found = resolver(&site, 64).resolve(NodeId(30)).unwrap().unwrap();
        assert_eq!(found.source, NodeId(20));
        assert_eq!(found.distance, 1);
    }

    #[test]
    fn test_nearest_ancestor_wins() {
        // topic 40 → forum 30 → [sub-forum 20, root forum 10]
        let site = FakeSite::default()
            .chain(40, 30, &[20, 10])
            .rule(20, 2)
            .rule(10, 1);

        let found = resolver(&site, 64).resolve(NodeId(40)).unwrap().unwrap();
        assert_eq!(found.source, NodeId(20));
        assert_eq!(found.distance, 2);
        assert_eq!(found.rule.product_ids(), &[ProductId(2)]);
    }

    #[test]
    fn test_root_rule_found_at_end_of_chain() {
        let site = FakeSite::default().chain(40, 30, &[20, 10]).rule(10, 1);

        let found = resolver(&site, 64).resolve(NodeId(40)).unwrap().unwrap();
        assert_eq!(found.source, NodeId(10));
        assert_eq!(found.distance, 3);
    }

    #[test]
    fn test_empty_rule_is_skipped() {
        let mut site = FakeSite::default().chain(3, 2, &[1]).rule(1, 9);
        site.rules.insert(
            NodeId(2),
            RestrictionRule {
                requirement: crate::types::Requirement::Products(Vec::new()),
                match_mode: None,
                message_variant: None,
            },
        );

        let found = resolver(&site, 64).resolve(NodeId(3)).unwrap().unwrap();
        assert_eq!(found.source, NodeId(1));
    }

    #[test]
    fn test_cycle_is_reported_strictly_and_degraded_by_default() {
        // 3 → 2 → [1, 2, ...]
        let site = FakeSite::default().chain(3, 2, &[1, 2, 1]);

        let err = resolver(&site, 64).resolve_strict(NodeId(3)).unwrap_err();
        assert_eq!(
            err,
            RestrictionError::DataIntegrity(IntegrityFault::Cycle { node: NodeId(2) })
        );

        assert_eq!(resolver(&site, 64).resolve(NodeId(3)).unwrap(), None);
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let site = FakeSite::default().chain(5, 5, &[]);
        let err = resolver(&site, 64).resolve_strict(NodeId(5)).unwrap_err();
        assert!(err.is_integrity());
    }

    #[test]
    fn test_rule_before_cycle_still_applies() {
        let site = FakeSite::default().chain(3, 2, &[1, 2]).rule(1, 4);

        let found = resolver(&site, 64).resolve_strict(NodeId(3)).unwrap().unwrap();
        assert_eq!(found.source, NodeId(1));
    }

    #[test]
    fn test_depth_cap() {
        let long: Vec<u64> = (100..200).collect();
        let site = FakeSite::default().chain(1, 2, &long).rule(199, 1);

        let err = resolver(&site, 8).resolve_strict(NodeId(1)).unwrap_err();
        assert_eq!(
            err,
            RestrictionError::DataIntegrity(IntegrityFault::DepthExceeded {
                node: NodeId(1),
                limit: 8,
            })
        );
        assert_eq!(resolver(&site, 8).resolve(NodeId(1)).unwrap(), None);

        // Same chain fits under a larger cap.
        let found = resolver(&site, 128).resolve(NodeId(1)).unwrap().unwrap();
        assert_eq!(found.source, NodeId(199));
    }

    #[test]
    fn test_zero_depth_still_reaches_structural_parent() {
        let site = FakeSite::default().chain(2, 1, &[]).rule(1, 5);

        let found = resolver(&site, 0).resolve_strict(NodeId(2)).unwrap().unwrap();
        assert_eq!(found.source, NodeId(1));
        assert_eq!(found.distance, 1);
    }

    #[test]
    fn test_hierarchy_failure_is_returned() {
        let mut site = FakeSite::default().chain(2, 1, &[]);
        site.hierarchy_down = true;

        let err = resolver(&site, 64).resolve(NodeId(2)).unwrap_err();
        assert!(matches!(
            err,
            RestrictionError::CollaboratorUnavailable {
                collaborator: Collaborator::ContentHierarchy,
                ..
            }
        ));
    }
}
