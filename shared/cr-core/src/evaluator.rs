//! Access evaluation against a resolved rule.
//!
//! The moderator bypass is not applied here; it is a precondition handled
//! once by [`ContentRestriction`](crate::ContentRestriction).

use tracing::warn;

use crate::collaborators::PurchaseHistory;
use crate::formatter::{MessageFormatter, TemplateKey};
use crate::types::{
    AccessDecision, MatchMode, NodeId, ProductId, Requirement, ResolvedRestriction,
    RestrictionRule, UserId,
};

/// Checks purchase history against restriction rules.
#[derive(Clone, Copy)]
pub struct AccessEvaluator<'a> {
    purchases: &'a dyn PurchaseHistory,
    formatter: MessageFormatter<'a>,
    default_match_mode: MatchMode,
}

impl<'a> AccessEvaluator<'a> {
    pub fn new(
        purchases: &'a dyn PurchaseHistory,
        formatter: MessageFormatter<'a>,
        default_match_mode: MatchMode,
    ) -> Self {
        Self {
            purchases,
            formatter,
            default_match_mode,
        }
    }

    /// Decide access to content governed by `restriction`.
    #[must_use]
    pub fn evaluate(
        &self,
        user: Option<UserId>,
        restriction: Option<&ResolvedRestriction>,
    ) -> AccessDecision {
        match restriction {
            Some(resolved) => self.evaluate_rule(user, Some(&resolved.rule), Some(resolved.source)),
            None => AccessDecision::allow(),
        }
    }

    /// Decide access under `rule`, attributing a denial to `source`.
    ///
    /// A guest never satisfies a rule. A purchase lookup that fails is
    /// never treated as proof of ownership.
    #[must_use]
    pub fn evaluate_rule(
        &self,
        user: Option<UserId>,
        rule: Option<&RestrictionRule>,
        source: Option<NodeId>,
    ) -> AccessDecision {
        let Some(rule) = rule.filter(|rule| !rule.is_empty()) else {
            return AccessDecision::allow();
        };

        let satisfied = user.is_some_and(|user| self.satisfies(user, rule));
        if satisfied {
            AccessDecision::allow()
        } else {
            self.denial(rule, source)
        }
    }

    /// Denial decision for `rule` with its rendered message.
    #[must_use]
    pub fn denial(&self, rule: &RestrictionRule, source: Option<NodeId>) -> AccessDecision {
        // Product templates have no names to show for an any-purchase rule.
        let key = if rule.product_ids().is_empty() {
            TemplateKey::AnyRestriction
        } else {
            rule.message_variant().template_key()
        };
        let message = self.formatter.format(key, rule.product_ids());
        AccessDecision::deny(message, source)
    }

    fn satisfies(&self, user: UserId, rule: &RestrictionRule) -> bool {
        match &rule.requirement {
            Requirement::AnyPurchase => match self.purchases.has_any_purchase(user) {
                Ok(has_any) => has_any,
                Err(e) => {
                    warn!(user = %user, error = %e, "Purchase lookup failed, denying access");
                    false
                }
            },
            Requirement::Products(products) => match rule.match_mode_or(self.default_match_mode) {
                MatchMode::AnyOf => products.iter().any(|product| self.owns(user, *product)),
                MatchMode::AllOf => products.iter().all(|product| self.owns(user, *product)),
            },
        }
    }

    fn owns(&self, user: UserId, product: ProductId) -> bool {
        match self.purchases.has_purchased(user, product) {
            Ok(owned) => owned,
            Err(e) => {
                warn!(
                    user = %user,
                    product = %product,
                    error = %e,
                    "Purchase lookup failed, denying access"
                );
                false
            }
        }
    }
}
