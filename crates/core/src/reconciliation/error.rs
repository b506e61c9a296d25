//! Reconciliation error types.

use keel_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::records::RecordsError;

/// Errors that can occur while setting up or feeding a reconciliation.
///
/// Monetary data never fails a reconciliation; only configuration and the
/// outer shape of the snapshot do.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Invalid engine settings.
    #[error(transparent)]
    Settings(#[from] AppError),

    /// Partial payment ratio outside `[0, 1]`.
    #[error("Invalid partial payment ratio: {0}")]
    InvalidPartialRatio(Decimal),

    /// Snapshot could not be read.
    #[error(transparent)]
    Records(#[from] RecordsError),
}
