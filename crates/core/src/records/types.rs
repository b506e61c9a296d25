//! Record data types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use keel_shared::types::{BookingId, ExpenseId, OrderId, PaymentId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;
use crate::amount::RawAmount;

/// Payment status shared by orders, linked orders, and expenses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "Value")]
pub enum PaymentStatus {
    /// Fully paid.
    Paid,
    /// Partly paid, no granular breakdown.
    PartiallyPaid,
    /// Nothing paid yet.
    Unpaid,
    /// Missing or unrecognized status.
    #[default]
    Unknown,
}

impl PaymentStatus {
    /// Parses a status string; unrecognized values are `Unknown`.
    #[must_use]
    pub fn parse(status: &str) -> Self {
        let normalized: String = status
            .trim()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c.to_ascii_lowercase() })
            .collect();
        match normalized.as_str() {
            "paid" => Self::Paid,
            "partially_paid" | "partiallypaid" | "partial" => Self::PartiallyPaid,
            "unpaid" | "not_paid" => Self::Unpaid,
            _ => Self::Unknown,
        }
    }
}

impl From<Value> for PaymentStatus {
    fn from(value: Value) -> Self {
        value.as_str().map_or(Self::Unknown, Self::parse)
    }
}

/// A date as a source record carried it: ISO text, epoch milliseconds, or a
/// `{seconds, nanoseconds}` timestamp object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawDate(Value);

impl RawDate {
    /// Parses the date, if it is readable.
    #[must_use]
    pub fn parse(&self) -> Option<DateTime<Utc>> {
        match &self.0 {
            Value::String(text) => parse_date_text(text.trim()),
            Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
            Value::Object(map) => {
                let seconds = map
                    .get("seconds")
                    .or_else(|| map.get("_seconds"))
                    .and_then(Value::as_i64)?;
                let nanos = map
                    .get("nanoseconds")
                    .or_else(|| map.get("_nanoseconds"))
                    .and_then(Value::as_u64)
                    .and_then(|n| u32::try_from(n).ok())
                    .unwrap_or(0);
                DateTime::from_timestamp(seconds, nanos)
            }
            _ => None,
        }
    }

    /// Parses the date, substituting `now` when it is missing or unreadable.
    ///
    /// The flag is true when `now` was substituted.
    #[must_use]
    pub fn resolve(&self, now: DateTime<Utc>) -> (DateTime<Utc>, bool) {
        self.parse().map_or((now, true), |date| (date, false))
    }
}

impl From<&str> for RawDate {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}

impl From<DateTime<Utc>> for RawDate {
    fn from(value: DateTime<Utc>) -> Self {
        Self(Value::String(value.to_rfc3339()))
    }
}

fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// One payment entry on a booking.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(remote = "Self", default, rename_all = "camelCase")]
pub struct PaymentRecord {
    /// Amount paid or expected.
    pub amount: RawAmount,
    /// When the payment happened or is due.
    pub date: RawDate,
    /// Payment method (cash, card, transfer...).
    #[serde(deserialize_with = "lenient::text")]
    pub method: Option<String>,
    /// Payment type (deposit, balance...).
    #[serde(rename = "type", deserialize_with = "lenient::text")]
    pub kind: Option<String>,
    /// Whether the money has been received.
    #[serde(deserialize_with = "lenient::flag")]
    pub received: bool,
    /// Identifier of the record that produced this payment.
    #[serde(deserialize_with = "lenient::text")]
    pub source_id: Option<String>,
}

/// An ancillary order attached to a booking.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(remote = "Self", default, rename_all = "camelCase")]
pub struct LinkedOrderRef {
    /// Order identifier, shared with the standalone order collection.
    #[serde(deserialize_with = "lenient::id")]
    pub order_id: Option<OrderId>,
    /// Order amount.
    pub amount: RawAmount,
    /// Order payment status.
    pub payment_status: PaymentStatus,
    /// Last update of the order, used as the payment date.
    pub updated_at: RawDate,
}

/// One owner-payment obligation slot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(remote = "Self", default, rename_all = "camelCase")]
pub struct OwnerPaymentSlot {
    /// Amount owed to the owner.
    pub amount: RawAmount,
    /// When the disbursement was made.
    pub date: RawDate,
    /// Completion signature; absent, blank, `false` or zero means not yet committed.
    #[serde(deserialize_with = "lenient::signature")]
    pub signature: Option<String>,
}

impl OwnerPaymentSlot {
    /// Returns true when the slot carries a completion signature.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.signature.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// Owner-payment slots of a booking.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OwnerPayments {
    /// First instalment.
    #[serde(deserialize_with = "lenient::record")]
    pub first: Option<OwnerPaymentSlot>,
    /// Second instalment.
    #[serde(deserialize_with = "lenient::record")]
    pub second: Option<OwnerPaymentSlot>,
    /// Transfer fee.
    #[serde(deserialize_with = "lenient::record")]
    pub transfer: Option<OwnerPaymentSlot>,
}

/// Which owner-payment slot an amount came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerSlotKind {
    /// First instalment.
    First,
    /// Second instalment.
    Second,
    /// Transfer fee.
    Transfer,
}

impl OwnerPayments {
    /// Slots in fixed order, skipping absent ones.
    pub fn slots(&self) -> impl Iterator<Item = (OwnerSlotKind, &OwnerPaymentSlot)> {
        [
            (OwnerSlotKind::First, self.first.as_ref()),
            (OwnerSlotKind::Second, self.second.as_ref()),
            (OwnerSlotKind::Transfer, self.transfer.as_ref()),
        ]
        .into_iter()
        .filter_map(|(kind, slot)| slot.map(|slot| (kind, slot)))
    }
}

/// A charter booking.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(remote = "Self", default, rename_all = "camelCase")]
pub struct BookingRecord {
    /// Booking identifier.
    #[serde(deserialize_with = "lenient::id")]
    pub id: Option<BookingId>,
    /// Price agreed with the client.
    pub agreed_price: RawAmount,
    /// Payments in the current nested layout.
    #[serde(deserialize_with = "lenient::records")]
    pub nested_payments: Vec<PaymentRecord>,
    /// Payments in the legacy root-level layout.
    #[serde(deserialize_with = "lenient::records")]
    pub legacy_root_payments: Vec<PaymentRecord>,
    /// Ancillary orders attached to the booking.
    #[serde(deserialize_with = "lenient::records")]
    pub linked_orders: Vec<LinkedOrderRef>,
    /// Owner-payment obligations.
    pub owner_payments: OwnerPayments,
    /// Legacy precomputed paid total.
    pub legacy_total_paid: RawAmount,
    /// Client display name.
    #[serde(deserialize_with = "lenient::text")]
    pub client_name: Option<String>,
}

/// Paid/due split stored on an order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(remote = "Self", default, rename_all = "camelCase")]
pub struct OrderPaymentDetails {
    /// Amount received so far.
    pub amount_paid: RawAmount,
    /// Amount still due.
    pub amount_due: RawAmount,
}

/// A standalone order (catering, provisioning...).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(remote = "Self", default, rename_all = "camelCase")]
pub struct OrderRecord {
    /// Order identifier.
    #[serde(deserialize_with = "lenient::id")]
    pub id: Option<OrderId>,
    /// Order amount.
    pub amount: RawAmount,
    /// Legacy name of the order amount.
    #[serde(rename = "amount_total")]
    pub amount_total: RawAmount,
    /// Stored paid/due split.
    #[serde(deserialize_with = "lenient::record")]
    pub payment_details: Option<OrderPaymentDetails>,
    /// Order payment status.
    pub payment_status: PaymentStatus,
}

/// An operating expense.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(remote = "Self", default, rename_all = "camelCase")]
pub struct ExpenseRecord {
    /// Expense identifier.
    #[serde(deserialize_with = "lenient::id")]
    pub id: Option<ExpenseId>,
    /// Expense amount.
    pub amount: RawAmount,
    /// Only `Paid` expenses are costs.
    pub payment_status: PaymentStatus,
    /// Expense category.
    #[serde(deserialize_with = "lenient::text")]
    pub category: Option<String>,
}

/// A payment recorded outside bookings and orders.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(remote = "Self", default, rename_all = "camelCase")]
pub struct StandalonePaymentRecord {
    /// Payment identifier.
    #[serde(deserialize_with = "lenient::id")]
    pub id: Option<PaymentId>,
    /// Amount received.
    pub amount: RawAmount,
    /// When it was received.
    pub date: RawDate,
    /// Booking this payment belongs to, if any.
    #[serde(deserialize_with = "lenient::id")]
    pub booking_id: Option<BookingId>,
    /// Order this payment belongs to, if any.
    #[serde(deserialize_with = "lenient::id")]
    pub order_id: Option<OrderId>,
}

impl StandalonePaymentRecord {
    /// True when the payment is already reflected through a booking or order.
    #[must_use]
    pub fn is_attributed(&self) -> bool {
        self.booking_id.as_ref().is_some_and(|id| !id.is_blank())
            || self.order_id.as_ref().is_some_and(|id| !id.is_blank())
    }
}

// Legacy spellings, in order of precedence after the camelCase key.
lenient::deserialize_with_aliases!(PaymentRecord { "sourceId" => ["source_id"] });
lenient::deserialize_with_aliases!(LinkedOrderRef {
    "orderId" => ["order_id", "id"],
    "paymentStatus" => ["payment_status"],
    "updatedAt" => ["updated_at"],
});
lenient::deserialize_with_aliases!(OwnerPaymentSlot { "signature" => ["signed"] });
lenient::deserialize_with_aliases!(BookingRecord {
    "agreedPrice" => ["agreed_price"],
    "nestedPayments" => ["nested_payments"],
    "legacyRootPayments" => ["legacy_root_payments"],
    "linkedOrders" => ["linked_orders"],
    "ownerPayments" => ["owner_payments"],
    "legacyTotalPaid" => ["legacy_total_paid"],
    "clientName" => ["client_name"],
});
lenient::deserialize_with_aliases!(OrderPaymentDetails {
    "amountPaid" => ["amount_paid"],
    "amountDue" => ["amount_due"],
});
lenient::deserialize_with_aliases!(OrderRecord {
    "amount_total" => ["amountTotal"],
    "paymentDetails" => ["payment_details"],
    "paymentStatus" => ["payment_status"],
});
lenient::deserialize_with_aliases!(ExpenseRecord { "paymentStatus" => ["payment_status"] });
lenient::deserialize_with_aliases!(StandalonePaymentRecord {
    "bookingId" => ["booking_id"],
    "orderId" => ["order_id"],
});

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[rstest]
    #[case("paid", PaymentStatus::Paid)]
    #[case("PAID", PaymentStatus::Paid)]
    #[case("partially_paid", PaymentStatus::PartiallyPaid)]
    #[case("partially-paid", PaymentStatus::PartiallyPaid)]
    #[case("partial", PaymentStatus::PartiallyPaid)]
    #[case("unpaid", PaymentStatus::Unpaid)]
    #[case("refunded", PaymentStatus::Unknown)]
    #[case("", PaymentStatus::Unknown)]
    fn test_payment_status_parse(#[case] input: &str, #[case] expected: PaymentStatus) {
        assert_eq!(PaymentStatus::parse(input), expected);
    }

    #[test]
    fn test_payment_status_from_non_string() {
        let order: OrderRecord = serde_json::from_value(json!({"paymentStatus": 3})).unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Unknown);
    }

    #[rstest]
    #[case(json!("2024-06-01T10:30:00Z"), Utc.with_ymd_and_hms(2024, 6, 1, 10, 30, 0).unwrap())]
    #[case(json!("2024-06-01T12:30:00+02:00"), Utc.with_ymd_and_hms(2024, 6, 1, 10, 30, 0).unwrap())]
    #[case(json!("2024-06-01"), Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())]
    #[case(json!("2024-06-01 08:00:00"), Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap())]
    #[case(json!(1_717_236_000_000_i64), Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap())]
    #[case(json!({"seconds": 1_717_236_000_i64, "nanoseconds": 0}), Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap())]
    #[case(json!({"_seconds": 1_717_236_000_i64}), Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap())]
    fn test_raw_date_parse(#[case] input: Value, #[case] expected: DateTime<Utc>) {
        assert_eq!(RawDate(input).parse(), Some(expected));
    }

    #[test]
    fn test_raw_date_fallback_is_flagged() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(RawDate::default().resolve(now), (now, true));
        assert_eq!(RawDate::from("not a date").resolve(now), (now, true));

        let known = Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap();
        assert_eq!(RawDate::from(known).resolve(now), (known, false));
    }

    #[test]
    fn test_booking_reads_wrong_field_types_as_absent() {
        let booking: BookingRecord = serde_json::from_value(json!({
            "id": 77,
            "agreedPrice": "1.500,00",
            "nestedPayments": "not a list",
            "legacyRootPayments": [{"amount": 100, "received": "yes"}, 42],
            "linkedOrders": [{"id": "X", "amount": "100", "paymentStatus": "paid"}],
            "ownerPayments": {"first": {"amount": 300, "signature": "Captain N."}, "second": 5},
            "clientName": ["?"],
            "somethingNew": true
        }))
        .unwrap();

        assert_eq!(booking.id, Some(BookingId::from("77")));
        assert_eq!(booking.agreed_price.normalize().as_decimal(), dec!(1500));
        assert!(booking.nested_payments.is_empty());
        assert_eq!(booking.legacy_root_payments.len(), 1);
        assert!(booking.legacy_root_payments[0].received);
        assert_eq!(booking.linked_orders[0].order_id, Some(OrderId::from("X")));
        assert!(booking.owner_payments.first.as_ref().is_some_and(OwnerPaymentSlot::is_signed));
        assert!(booking.owner_payments.second.is_none());
        assert!(booking.client_name.is_none());
        assert!(!booking.legacy_total_paid.is_present());
    }

    #[test]
    fn test_order_legacy_amount_field() {
        let order: OrderRecord =
            serde_json::from_value(json!({"id": "o1", "amount_total": 80})).unwrap();
        assert!(!order.amount.is_present());
        assert_eq!(order.amount_total.normalize().as_decimal(), dec!(80));
        assert!(order.payment_details.is_none());
    }

    #[test]
    fn test_owner_slots_order_and_signature() {
        let owner: OwnerPayments = serde_json::from_value(json!({
            "transfer": {"amount": 50, "signature": "  "},
            "first": {"amount": 100, "signed": true}
        }))
        .unwrap();
        let slots: Vec<_> = owner.slots().map(|(kind, slot)| (kind, slot.is_signed())).collect();
        assert_eq!(
            slots,
            vec![(OwnerSlotKind::First, true), (OwnerSlotKind::Transfer, false)]
        );
    }

    #[rstest]
    #[case(json!({"signed": 0}), false)]
    #[case(json!({"signature": 0}), false)]
    #[case(json!({"signature": 0.0}), false)]
    #[case(json!({"signed": false}), false)]
    #[case(json!({"signed": ""}), false)]
    #[case(json!({"signed": 1}), true)]
    #[case(json!({"signature": "cpt", "signed": 0}), true)]
    #[case(json!({"signature": null, "signed": "cpt"}), true)]
    fn test_owner_slot_signature_values(#[case] input: Value, #[case] signed: bool) {
        let slot: OwnerPaymentSlot = serde_json::from_value(input).unwrap();
        assert_eq!(slot.is_signed(), signed);
    }

    #[test]
    fn test_both_key_spellings_keep_the_record() {
        let booking: BookingRecord = serde_json::from_value(json!({
            "id": "b1",
            "agreedPrice": 1000,
            "agreed_price": 900,
            "nestedPayments": [{"amount": 400, "received": true}],
            "nested_payments": null,
            "client_name": "Legacy",
            "clientName": null,
            "linkedOrders": [{"orderId": "X", "id": "Y", "amount": 100, "paymentStatus": "paid"}]
        }))
        .unwrap();

        assert_eq!(booking.agreed_price.normalize().as_decimal(), dec!(1000));
        assert_eq!(booking.nested_payments.len(), 1);
        assert_eq!(booking.client_name.as_deref(), Some("Legacy"));
        assert_eq!(booking.linked_orders.len(), 1);
        assert_eq!(booking.linked_orders[0].order_id, Some(OrderId::from("X")));

        let order: OrderRecord = serde_json::from_value(json!({
            "id": "o1",
            "amount_total": 80,
            "amountTotal": 70,
            "paymentStatus": "paid",
            "payment_status": "unpaid"
        }))
        .unwrap();
        assert_eq!(order.amount_total.normalize().as_decimal(), dec!(80));
        assert_eq!(order.payment_status, PaymentStatus::Paid);

        let payment: StandalonePaymentRecord =
            serde_json::from_value(json!({"id": "p1", "orderId": "o1", "order_id": "o2"})).unwrap();
        assert_eq!(payment.order_id, Some(OrderId::from("o1")));
    }

    #[test]
    fn test_standalone_payment_attribution() {
        let free: StandalonePaymentRecord =
            serde_json::from_value(json!({"id": "p1", "amount": 10, "bookingId": ""})).unwrap();
        assert!(!free.is_attributed());

        let tied: StandalonePaymentRecord =
            serde_json::from_value(json!({"id": "p2", "amount": 10, "orderId": "o9"})).unwrap();
        assert!(tied.is_attributed());
    }
}
