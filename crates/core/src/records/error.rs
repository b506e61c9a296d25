//! Record intake error types.

use thiserror::Error;

/// Violations of the input-shape contract.
///
/// These are the only hard failures of a reconciliation; every irregularity
/// inside a record degrades to zero or absent instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordsError {
    /// The snapshot itself is not a JSON object.
    #[error("Snapshot must be an object, got {found}")]
    NotASnapshot {
        /// JSON type that was supplied.
        found: &'static str,
    },

    /// A collection key holds something other than an array.
    #[error("Field `{field}` must be a collection, got {found}")]
    NotACollection {
        /// Snapshot key.
        field: &'static str,
        /// JSON type that was supplied.
        found: &'static str,
    },
}
