//! Source record model.
//!
//! Records arrive from an external persistence layer in whatever shape the
//! writing client used. Every field is optional and read leniently: a field of
//! the wrong type becomes "absent" instead of failing the record, and unknown
//! fields are ignored.

pub mod error;
pub mod lenient;
pub mod snapshot;
pub mod types;

pub use error::RecordsError;
pub use snapshot::ReconciliationInput;
pub use types::*;
