//! Typed IDs for type-safe record references.
//!
//! Source systems hand out identifiers as strings or bare integers, so every ID
//! is a string newtype that accepts either on deserialization. Using typed IDs
//! prevents accidentally looking up a `BookingId` in the order index.

use serde::{Deserialize, Serialize};

/// Identifier as it appears in loosely-shaped input.
#[doc(hidden)]
#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// String identifier.
    Text(String),
    /// Integer identifier.
    Signed(i64),
    /// Integer identifier above `i64::MAX`.
    Unsigned(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text.trim().to_string(),
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        }
    }
}

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(from = "RawId", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates an ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true when the source supplied an empty identifier.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl From<RawId> for $name {
            fn from(raw: RawId) -> Self {
                Self(raw.into())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(BookingId, "Identifier of a booking record.");
typed_id!(OrderId, "Identifier of an order, standalone or linked to a booking.");
typed_id!(ExpenseId, "Identifier of an expense record.");
typed_id!(PaymentId, "Identifier of a standalone payment record.");
