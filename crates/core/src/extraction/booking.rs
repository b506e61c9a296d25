//! Payment extraction for bookings.

use chrono::{DateTime, Utc};
use keel_shared::types::MonetaryAmount;

use super::policy::PartialPaymentPolicy;
use super::types::{BookingPayments, PaymentItem, PaymentSource};
use crate::records::{BookingRecord, LinkedOrderRef, PaymentRecord, PaymentStatus};

/// Derives paid and outstanding totals of one booking.
///
/// Nested and legacy root payment lists are both honored. Linked orders are
/// itemized and tagged with their order id. Fallbacks only apply when the
/// computed figure is exactly zero:
/// - `total_paid` falls back to the legacy precomputed total;
/// - `total_outstanding` falls back to `agreed_price - total_paid`.
///
/// `now` is used only as the date of items whose source date is unreadable.
#[must_use]
pub fn extract_booking_payments(
    booking: &BookingRecord,
    policy: &dyn PartialPaymentPolicy,
    now: DateTime<Utc>,
) -> BookingPayments {
    let agreed_price = booking.agreed_price.normalize();

    let mut received_payments = Vec::new();
    let mut pending_payments = Vec::new();

    for payment in booking
        .nested_payments
        .iter()
        .chain(&booking.legacy_root_payments)
    {
        let item = booking_item(payment, now);
        if payment.received {
            received_payments.push(item);
        } else {
            pending_payments.push(item);
        }
    }

    for linked in &booking.linked_orders {
        let (received, pending) = split_linked_order(linked, policy);
        if let Some(amount) = received {
            received_payments.push(linked_item(linked, amount, now));
        }
        if let Some(amount) = pending {
            pending_payments.push(linked_item(linked, amount, now));
        }
    }

    let mut total_paid: MonetaryAmount = received_payments.iter().map(|item| item.amount).sum();
    let mut total_outstanding: MonetaryAmount =
        pending_payments.iter().map(|item| item.amount).sum();

    if total_paid.is_zero() && booking.legacy_total_paid.is_present() {
        total_paid = booking.legacy_total_paid.normalize();
    }
    if total_outstanding.is_zero() && agreed_price > total_paid {
        total_outstanding = agreed_price - total_paid;
    }

    BookingPayments {
        agreed_price,
        total_paid,
        total_outstanding,
        received_payments,
        pending_payments,
    }
}

/// Received and pending shares of a linked order, by status.
fn split_linked_order(
    linked: &LinkedOrderRef,
    policy: &dyn PartialPaymentPolicy,
) -> (Option<MonetaryAmount>, Option<MonetaryAmount>) {
    let amount = linked.amount.normalize();
    match linked.payment_status {
        PaymentStatus::Paid => (Some(amount), None),
        PaymentStatus::PartiallyPaid => {
            let split = policy.split(amount);
            (Some(split.received), Some(split.pending))
        }
        PaymentStatus::Unpaid | PaymentStatus::Unknown => (None, Some(amount)),
    }
}

fn booking_item(payment: &PaymentRecord, now: DateTime<Utc>) -> PaymentItem {
    let (date, date_is_fallback) = payment.date.resolve(now);
    PaymentItem {
        amount: payment.amount.normalize(),
        date,
        date_is_fallback,
        method: payment.method.clone(),
        kind: payment.kind.clone(),
        source_id: payment.source_id.clone(),
        source: PaymentSource::Booking,
    }
}

fn linked_item(linked: &LinkedOrderRef, amount: MonetaryAmount, now: DateTime<Utc>) -> PaymentItem {
    let (date, date_is_fallback) = linked.updated_at.resolve(now);
    PaymentItem {
        amount,
        date,
        date_is_fallback,
        method: None,
        kind: Some("linked_order".to_string()),
        source_id: linked.order_id.as_ref().map(ToString::to_string),
        source: PaymentSource::LinkedOrder {
            order_id: linked.order_id.clone(),
        },
    }
}
