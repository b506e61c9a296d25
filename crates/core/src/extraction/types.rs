//! Extraction output types.

use chrono::{DateTime, Utc};
use keel_shared::types::{MonetaryAmount, OrderId};
use serde::Serialize;

/// Where an itemized payment came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentSource {
    /// A payment entry on the booking itself.
    Booking,
    /// A share of an order linked to the booking.
    LinkedOrder {
        /// The linked order, used for cross-collection dedup.
        #[serde(rename = "orderId")]
        order_id: Option<OrderId>,
    },
}

/// One itemized payment, received or pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentItem {
    /// Payment amount.
    pub amount: MonetaryAmount,
    /// Payment date.
    pub date: DateTime<Utc>,
    /// True when the record had no readable date and the reconciliation
    /// time was substituted.
    pub date_is_fallback: bool,
    /// Payment method.
    pub method: Option<String>,
    /// Payment type.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Originating record id, as the source stored it.
    pub source_id: Option<String>,
    /// Booking entry or linked order.
    pub source: PaymentSource,
}

impl PaymentItem {
    /// Returns true for shares of linked orders.
    #[must_use]
    pub const fn is_linked_order(&self) -> bool {
        matches!(self.source, PaymentSource::LinkedOrder { .. })
    }
}

/// Paid and outstanding figures of one booking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayments {
    /// Price agreed with the client.
    pub agreed_price: MonetaryAmount,
    /// Everything received, linked orders included.
    pub total_paid: MonetaryAmount,
    /// Everything still pending, linked orders included.
    pub total_outstanding: MonetaryAmount,
    /// Received items.
    pub received_payments: Vec<PaymentItem>,
    /// Pending items.
    pub pending_payments: Vec<PaymentItem>,
}

impl BookingPayments {
    /// Received amount that came through linked orders.
    #[must_use]
    pub fn linked_order_received(&self) -> MonetaryAmount {
        self.received_payments
            .iter()
            .filter(|item| item.is_linked_order())
            .map(|item| item.amount)
            .sum()
    }

    /// Received amount attributable to the booking alone.
    #[must_use]
    pub fn booking_only_received(&self) -> MonetaryAmount {
        self.total_paid - self.linked_order_received()
    }
}

/// Paid and due figures of one standalone order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayments {
    /// Order amount.
    pub total_amount: MonetaryAmount,
    /// Amount received.
    pub amount_paid: MonetaryAmount,
    /// Amount still due.
    pub amount_due: MonetaryAmount,
}
