//! Identifier newtypes.
//!
//! The host platform hands out plain integers for posts, users and products;
//! wrapping them keeps a product id from being passed where a node id is
//! expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw integer value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Content node (post, page, forum, topic, reply) identifier.
    NodeId
);

numeric_id!(
    /// Host user identifier.
    UserId
);

numeric_id!(
    /// Catalog product identifier.
    ProductId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&NodeId(42)).unwrap();
        assert_eq!(json, "42");

        let product: ProductId = serde_json::from_str("9").unwrap();
        assert_eq!(product, ProductId(9));
        assert_eq!(product.to_string(), "9");
    }
}
