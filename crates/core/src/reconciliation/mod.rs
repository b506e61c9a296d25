//! Reconciliation of bookings, orders, expenses and payments.
//!
//! This module folds a whole snapshot into one report:
//! - Booking revenue, linked orders included
//! - Standalone order revenue, minus orders already counted through a booking
//! - Paid expenses and signed owner payments as costs
//! - Unattributed standalone payments as other revenue
//!
//! See [`ReconciliationEngine`] for the entry points.

pub mod accumulator;
pub mod dedup;
pub mod error;
pub mod service;
pub mod types;


pub use accumulator::{Accumulator, Contribution};
pub use dedup::LinkedOrderIndex;
pub use error::ReconcileError;
pub use service::ReconciliationEngine;
pub use types::*;
