//! Core reconciliation logic for Keel.
//!
//! This crate contains pure business logic with no I/O. Snapshots come in as
//! loosely shaped records and leave as an immutable report.
//!
//! # Modules
//!
//! - `amount` - Lenient normalization of monetary values
//! - `records` - Source record model and snapshot intake
//! - `extraction` - Per-record paid and outstanding figures
//! - `reconciliation` - Aggregation with cross-collection dedup
//! - `metrics` - Percentage change and profit margin

pub mod amount;
pub mod extraction;
pub mod metrics;
pub mod reconciliation;
pub mod records;

pub use reconciliation::{DateRange, ReconcileError, ReconciliationEngine, ReconciliationReport};
pub use records::ReconciliationInput;
