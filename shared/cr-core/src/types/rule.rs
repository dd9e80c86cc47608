//! Restriction rules.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ids::{NodeId, ProductId};
use crate::formatter::TemplateKey;

/// Policy for combining several required products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Owning any one of the listed products is enough.
    #[default]
    AnyOf,
    /// Every listed product must be owned.
    AllOf,
}

impl MatchMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AnyOf => "any_of",
            Self::AllOf => "all_of",
        }
    }
}

/// Error returned when parsing a [`MatchMode`] or [`MessageVariant`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseVariantError {
    kind: &'static str,
    value: String,
}

impl FromStr for MatchMode {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any_of" | "any" => Ok(Self::AnyOf),
            "all_of" | "all" => Ok(Self::AllOf),
            other => Err(ParseVariantError {
                kind: "match mode",
                value: other.to_string(),
            }),
        }
    }
}

/// Which denial message a rule uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageVariant {
    Single,
    Multi,
    Any,
}

impl MessageVariant {
    /// Template used to render a denial under this variant.
    #[must_use]
    pub const fn template_key(self) -> TemplateKey {
        match self {
            Self::Single => TemplateKey::SingleRestriction,
            Self::Multi => TemplateKey::MultiRestriction,
            Self::Any => TemplateKey::AnyRestriction,
        }
    }
}

impl FromStr for MessageVariant {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "multi" | "multiple" => Ok(Self::Multi),
            "any" => Ok(Self::Any),
            other => Err(ParseVariantError {
                kind: "message variant",
                value: other.to_string(),
            }),
        }
    }
}

/// What a viewer must have bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "products", rename_all = "snake_case")]
pub enum Requirement {
    /// Any completed purchase qualifies.
    AnyPurchase,
    /// One or more specific products.
    Products(Vec<ProductId>),
}

/// Product-ownership requirement attached to a content node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionRule {
    pub requirement: Requirement,
    /// `None` defers to the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_mode: Option<MatchMode>,
    /// `None` picks the template from the requirement's shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_variant: Option<MessageVariant>,
}

impl RestrictionRule {
    /// Rule requiring one of `products`. Duplicates are dropped, order kept.
    ///
    /// Returns `None` for an empty list: an empty rule is no rule.
    pub fn products<I>(products: I) -> Option<Self>
    where
        I: IntoIterator<Item = ProductId>,
    {
        let mut unique: Vec<ProductId> = Vec::new();
        for product in products {
            if !unique.contains(&product) {
                unique.push(product);
            }
        }

        if unique.is_empty() {
            return None;
        }

        Some(Self {
            requirement: Requirement::Products(unique),
            match_mode: None,
            message_variant: None,
        })
    }

    /// Rule satisfied by any purchase at all.
    #[must_use]
    pub const fn any_purchase() -> Self {
        Self {
            requirement: Requirement::AnyPurchase,
            match_mode: None,
            message_variant: None,
        }
    }

    #[must_use]
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = Some(mode);
        self
    }

    #[must_use]
    pub fn with_message_variant(mut self, variant: MessageVariant) -> Self {
        self.message_variant = Some(variant);
        self
    }

    /// A product rule with no products enforces nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(&self.requirement, Requirement::Products(products) if products.is_empty())
    }

    /// Required products; empty for [`Requirement::AnyPurchase`].
    #[must_use]
    pub fn product_ids(&self) -> &[ProductId] {
        match &self.requirement {
            Requirement::AnyPurchase => &[],
            Requirement::Products(products) => products,
        }
    }

    /// Effective match mode given the configured default.
    #[must_use]
    pub fn match_mode_or(&self, default: MatchMode) -> MatchMode {
        self.match_mode.unwrap_or(default)
    }

    /// Effective message variant.
    #[must_use]
    pub fn message_variant(&self) -> MessageVariant {
        if let Some(variant) = self.message_variant {
            return variant;
        }

        match &self.requirement {
            Requirement::AnyPurchase => MessageVariant::Any,
            Requirement::Products(products) if products.len() > 1 => MessageVariant::Multi,
            Requirement::Products(_) => MessageVariant::Single,
        }
    }
}

/// A rule together with the node it was found on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRestriction {
    pub rule: RestrictionRule,
    /// Node carrying the rule.
    pub source: NodeId,
    /// Steps from the queried node to `source` (0 = the node itself).
    pub distance: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_products_rule_dedups_and_rejects_empty() {
        let rule = RestrictionRule::products([ProductId(1), ProductId(2), ProductId(1)]).unwrap();
        assert_eq!(rule.product_ids(), &[ProductId(1), ProductId(2)]);
        assert!(RestrictionRule::products(Vec::new()).is_none());
    }

    #[test]
    fn test_message_variant_derivation() {
        let single = RestrictionRule::products([ProductId(1)]).unwrap();
        assert_eq!(single.message_variant(), MessageVariant::Single);

        let multi = RestrictionRule::products([ProductId(1), ProductId(2)]).unwrap();
        assert_eq!(multi.message_variant(), MessageVariant::Multi);

        assert_eq!(
            RestrictionRule::any_purchase().message_variant(),
            MessageVariant::Any
        );

        let forced = multi.with_message_variant(MessageVariant::Single);
        assert_eq!(forced.message_variant(), MessageVariant::Single);
    }

    #[test]
    fn test_match_mode_default_and_override() {
        let rule = RestrictionRule::products([ProductId(1)]).unwrap();
        assert_eq!(rule.match_mode_or(MatchMode::AnyOf), MatchMode::AnyOf);
        assert_eq!(rule.match_mode_or(MatchMode::AllOf), MatchMode::AllOf);

        let all = rule.with_match_mode(MatchMode::AllOf);
        assert_eq!(all.match_mode_or(MatchMode::AnyOf), MatchMode::AllOf);
    }

    #[test]
    fn test_parse_match_mode_and_variant() {
        assert_eq!("all".parse::<MatchMode>().unwrap(), MatchMode::AllOf);
        assert_eq!(" ANY_OF ".parse::<MatchMode>().unwrap(), MatchMode::AnyOf);
        assert!("some".parse::<MatchMode>().is_err());
        assert_eq!(
            "multiple".parse::<MessageVariant>().unwrap(),
            MessageVariant::Multi
        );
    }

    #[test]
    fn test_empty_rule_detection() {
        let empty = RestrictionRule {
            requirement: Requirement::Products(Vec::new()),
            match_mode: None,
            message_variant: None,
        };
        assert!(empty.is_empty());
        assert!(!RestrictionRule::any_purchase().is_empty());
    }

    #[test]
    fn test_rule_json_shape() {
        let rule = RestrictionRule::products([ProductId(3), ProductId(4)])
            .unwrap()
            .with_match_mode(MatchMode::AllOf);
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["requirement"]["type"], "products");
        assert_eq!(json["requirement"]["products"][1], 4);
        assert_eq!(json["match_mode"], "all_of");
        assert!(json.get("message_variant").is_none());

        let any: RestrictionRule =
            serde_json::from_value(serde_json::json!({ "requirement": { "type": "any_purchase" } }))
                .unwrap();
        assert_eq!(any, RestrictionRule::any_purchase());
    }
}
