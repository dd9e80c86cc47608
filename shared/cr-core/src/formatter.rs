//! Denial message formatting.
//!
//! Templates are site-configurable rich text. Product names come from the
//! catalog, which is user-editable, so they are escaped before they are
//! spliced into the template.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::collaborators::{ProductCatalog, TemplateStore};
use crate::error::RestrictionError;
use crate::types::ProductId;

/// Placeholder in the single-product template.
pub const PRODUCT_NAME_PLACEHOLDER: &str = "{product_name}";

/// Placeholder in the multi-product template.
pub const PRODUCT_NAMES_PLACEHOLDER: &str = "{product_names}";

/// Separator between product names in `{product_names}`.
pub const PRODUCT_NAME_SEPARATOR: &str = ", ";

/// Configurable message templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKey {
    /// Access restricted by a single product.
    SingleRestriction,
    /// Access restricted by several products.
    MultiRestriction,
    /// Access restricted to anyone who has bought something.
    AnyRestriction,
    /// The restriction state could not be determined.
    Unavailable,
}

impl TemplateKey {
    /// Every key, in settings-page order.
    pub const ALL: [Self; 4] = [
        Self::SingleRestriction,
        Self::MultiRestriction,
        Self::AnyRestriction,
        Self::Unavailable,
    ];

    /// Key under which the template is stored in site settings.
    #[must_use]
    pub const fn setting_key(&self) -> &'static str {
        match self {
            Self::SingleRestriction => "single_restriction_message",
            Self::MultiRestriction => "multi_restriction_message",
            Self::AnyRestriction => "any_restriction_message",
            Self::Unavailable => "unavailable_message",
        }
    }

    /// Built-in template used when the site has none configured.
    #[must_use]
    pub const fn default_template(&self) -> &'static str {
        match self {
            Self::SingleRestriction => "This content is restricted to buyers of {product_name}.",
            Self::MultiRestriction => "This content is restricted to buyers of {product_names}.",
            Self::AnyRestriction => "This content is restricted to buyers.",
            Self::Unavailable => "This content is temporarily unavailable.",
        }
    }

    /// Placeholder substituted in this template, if any.
    #[must_use]
    pub const fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::SingleRestriction => Some(PRODUCT_NAME_PLACEHOLDER),
            Self::MultiRestriction => Some(PRODUCT_NAMES_PLACEHOLDER),
            Self::AnyRestriction | Self::Unavailable => None,
        }
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.setting_key())
    }
}

impl FromStr for TemplateKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.setting_key() == s)
            .ok_or_else(|| format!("unknown template key: {s}"))
    }
}

/// Escape text for inclusion in HTML.
#[must_use]
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Renders denial messages.
#[derive(Clone, Copy)]
pub struct MessageFormatter<'a> {
    templates: &'a dyn TemplateStore,
    catalog: &'a dyn ProductCatalog,
}

impl<'a> MessageFormatter<'a> {
    pub fn new(templates: &'a dyn TemplateStore, catalog: &'a dyn ProductCatalog) -> Self {
        Self { templates, catalog }
    }

    /// Render the template for `key`, substituting the names of `products`.
    #[must_use]
    pub fn format(&self, key: TemplateKey, products: &[ProductId]) -> String {
        let template = self.template(key);

        match key.placeholder() {
            Some(placeholder) => template.replace(placeholder, &self.product_names(products)),
            None => template,
        }
    }

    /// Configured template for `key`, or the built-in default.
    #[must_use]
    pub fn template(&self, key: TemplateKey) -> String {
        match self.templates.message_template(key) {
            Some(template) if !template.trim().is_empty() => template,
            _ => {
                let error = RestrictionError::ConfigurationMissing { key };
                debug!(%error, "Using built-in message template");
                key.default_template().to_string()
            }
        }
    }

    /// Escaped, comma-joined product names.
    fn product_names(&self, products: &[ProductId]) -> String {
        products
            .iter()
            .map(|product| self.product_name(*product))
            .collect::<Vec<_>>()
            .join(PRODUCT_NAME_SEPARATOR)
    }

    fn product_name(&self, product: ProductId) -> String {
        match self.catalog.product_name(product) {
            Ok(name) if !name.trim().is_empty() => escape_html(&name),
            Ok(_) => product.to_string(),
            Err(e) => {
                warn!(product = %product, error = %e, "Product name lookup failed, using id");
                product.to_string()
            }
        }
    }
}
