//! Newtype IDs for type-safe entity references.
//!
//! The commerce backend issues opaque string identifiers (hex object ids) for
//! every entity. Use the `define_id!` macro to create type-safe wrappers that
//! prevent accidentally mixing IDs from different entity types.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>`, and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use farmferry_core::define_id;
/// define_id!(ProductId);
/// define_id!(OrderId);
///
/// let product_id = ProductId::new("66b2f1e9a4c8d90012ab34cd");
/// let order_id = OrderId::new("66b2f1e9a4c8d90012ab34ce");
///
/// // These are different types, so this won't compile:
/// // let _: ProductId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(ProductId);
define_id!(CategoryId);
define_id!(SupplierId);
define_id!(CustomerId);
define_id!(CartLineId);
define_id!(AddressId);
define_id!(OrderId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let id = ProductId::new("66b2f1e9a4c8d90012ab34cd");
        assert_eq!(id.as_str(), "66b2f1e9a4c8d90012ab34cd");
        assert_eq!(id.to_string(), "66b2f1e9a4c8d90012ab34cd");
        assert_eq!(String::from(id), "66b2f1e9a4c8d90012ab34cd");
    }

    #[test]
    fn test_ids_are_distinct_types() {
        let product = ProductId::new("abc");
        let category = CategoryId::new("abc");
        // Same underlying value, different types - only comparable within a type
        assert_eq!(product, ProductId::new("abc"));
        assert_eq!(category.as_str(), product.as_str());
    }

    #[test]
    fn test_serde_transparent() {
        let id = OrderId::new("ord-1");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"ord-1\"");

        let back: OrderId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }
}
