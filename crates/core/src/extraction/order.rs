//! Payment extraction for standalone orders.

use keel_shared::types::MonetaryAmount;

use super::policy::PartialPaymentPolicy;
use super::types::OrderPayments;
use crate::records::{OrderRecord, PaymentStatus};

/// Derives paid and due figures of one standalone order.
///
/// A stored paid/due split wins; when both sides are zero the status fills
/// in. Without a stored split the status decides alone, partially paid
/// orders going through `policy`.
#[must_use]
pub fn extract_order_payments(order: &OrderRecord, policy: &dyn PartialPaymentPolicy) -> OrderPayments {
    let total_amount = if order.amount.is_present() {
        order.amount.normalize()
    } else {
        order.amount_total.normalize()
    };

    let (amount_paid, amount_due) = match &order.payment_details {
        Some(details) => {
            let mut paid = details.amount_paid.normalize();
            let mut due = details.amount_due.normalize();

            if paid.is_zero() && due.is_zero() && !total_amount.is_zero() {
                match order.payment_status {
                    PaymentStatus::Paid => paid = total_amount,
                    PaymentStatus::Unpaid => due = total_amount,
                    PaymentStatus::PartiallyPaid | PaymentStatus::Unknown => {}
                }
            }
            if due.is_zero() && total_amount > paid {
                due = total_amount - paid;
            }
            (paid, due)
        }
        None => match order.payment_status {
            PaymentStatus::Paid => (total_amount, MonetaryAmount::ZERO),
            PaymentStatus::PartiallyPaid => {
                let split = policy.split(total_amount);
                (split.received, split.pending)
            }
            PaymentStatus::Unpaid | PaymentStatus::Unknown => (MonetaryAmount::ZERO, total_amount),
        },
    };

    OrderPayments {
        total_amount,
        amount_paid,
        amount_due,
    }
}
