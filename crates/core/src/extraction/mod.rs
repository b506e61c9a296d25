//! Per-record payment extraction.
//!
//! This module derives paid and outstanding figures from single records:
//! - Bookings, including their linked orders
//! - Standalone orders
//!
//! Both variants share one [`PartialPaymentPolicy`] for orders marked
//! partially paid without a granular breakdown.

pub mod booking;
pub mod order;
pub mod policy;
pub mod types;

#[cfg(test)]
mod tests;

pub use booking::extract_booking_payments;
pub use order::extract_order_payments;
pub use policy::{FixedRatio, HalfSplit, PartialPaymentPolicy, PartialSplit};
pub use types::{BookingPayments, OrderPayments, PaymentItem, PaymentSource};
