//! Tests for booking and order extraction.

use chrono::{DateTime, TimeZone, Utc};
use keel_shared::types::OrderId;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use super::booking::extract_booking_payments;
use super::order::extract_order_payments;
use super::policy::{FixedRatio, HalfSplit};
use super::types::PaymentSource;
use crate::records::{BookingRecord, OrderRecord};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
}

fn booking(value: serde_json::Value) -> BookingRecord {
    serde_json::from_value(value).unwrap()
}

fn order(value: serde_json::Value) -> OrderRecord {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_explicit_pending_entry_blocks_agreed_price_fallback() {
    let record = booking(json!({
        "agreedPrice": 1000,
        "nestedPayments": [
            {"amount": 400, "received": true, "date": "2025-04-01"},
            {"amount": 200, "received": false, "date": "2025-06-01"}
        ]
    }));

    let result = extract_booking_payments(&record, &HalfSplit, now());

    assert_eq!(result.agreed_price.as_decimal(), dec!(1000));
    assert_eq!(result.total_paid.as_decimal(), dec!(400));
    assert_eq!(result.total_outstanding.as_decimal(), dec!(200));
    assert_eq!(result.received_payments.len(), 1);
    assert_eq!(result.pending_payments.len(), 1);
}

#[test]
fn test_legacy_total_paid_fallback_then_outstanding_fallback() {
    let record = booking(json!({"agreedPrice": 500, "legacyTotalPaid": 500}));

    let result = extract_booking_payments(&record, &HalfSplit, now());

    assert_eq!(result.total_paid.as_decimal(), dec!(500));
    assert!(result.total_outstanding.is_zero());
}

#[test]
fn test_agreed_price_fallback_when_nothing_pending() {
    let record = booking(json!({
        "agreedPrice": "2.000,00",
        "payments": [],
        "legacyRootPayments": [{"amount": "750", "received": true}]
    }));

    let result = extract_booking_payments(&record, &HalfSplit, now());

    assert_eq!(result.total_paid.as_decimal(), dec!(750));
    assert_eq!(result.total_outstanding.as_decimal(), dec!(1250));
}

#[test]
fn test_nested_and_legacy_lists_are_both_counted() {
    let record = booking(json!({
        "nestedPayments": [{"amount": 100, "received": true}],
        "legacyRootPayments": [{"amount": 50, "received": true}, {"amount": 25}]
    }));

    let result = extract_booking_payments(&record, &HalfSplit, now());

    assert_eq!(result.total_paid.as_decimal(), dec!(150));
    assert_eq!(result.total_outstanding.as_decimal(), dec!(25));
}

#[test]
fn test_legacy_total_ignored_when_payments_received() {
    let record = booking(json!({
        "nestedPayments": [{"amount": 100, "received": true}],
        "legacyTotalPaid": 900
    }));

    let result = extract_booking_payments(&record, &HalfSplit, now());

    assert_eq!(result.total_paid.as_decimal(), dec!(100));
}

#[test]
fn test_empty_booking_is_all_zero() {
    let result = extract_booking_payments(&BookingRecord::default(), &HalfSplit, now());

    assert!(result.agreed_price.is_zero());
    assert!(result.total_paid.is_zero());
    assert!(result.total_outstanding.is_zero());
    assert!(result.received_payments.is_empty());
    assert!(result.pending_payments.is_empty());
}

#[test]
fn test_linked_orders_are_tagged_by_status() {
    let record = booking(json!({
        "linkedOrders": [
            {"orderId": "A", "amount": 100, "paymentStatus": "paid", "updatedAt": "2025-04-10"},
            {"orderId": "B", "amount": 60, "paymentStatus": "partially_paid"},
            {"orderId": "C", "amount": 40, "paymentStatus": "unpaid"}
        ]
    }));

    let result = extract_booking_payments(&record, &HalfSplit, now());

    assert_eq!(result.total_paid.as_decimal(), dec!(130));
    assert_eq!(result.total_outstanding.as_decimal(), dec!(70));
    assert_eq!(result.linked_order_received().as_decimal(), dec!(130));
    assert!(result.booking_only_received().is_zero());

    let received_ids: Vec<_> = result
        .received_payments
        .iter()
        .map(|item| item.source.clone())
        .collect();
    assert_eq!(
        received_ids,
        vec![
            PaymentSource::LinkedOrder {
                order_id: Some(OrderId::from("A"))
            },
            PaymentSource::LinkedOrder {
                order_id: Some(OrderId::from("B"))
            },
        ]
    );
    assert!(result.pending_payments.iter().all(|item| item.is_linked_order()));
}

#[test]
fn test_partial_policy_is_pluggable() {
    let record = booking(json!({
        "linkedOrders": [{"orderId": "B", "amount": 200, "paymentStatus": "partially_paid"}]
    }));
    let policy = FixedRatio::new(dec!(0.25)).unwrap();

    let result = extract_booking_payments(&record, &policy, now());

    assert_eq!(result.total_paid.as_decimal(), dec!(50));
    assert_eq!(result.total_outstanding.as_decimal(), dec!(150));
}

#[test]
fn test_missing_dates_are_flagged_and_do_not_affect_totals() {
    let record = booking(json!({
        "nestedPayments": [
            {"amount": 10, "received": true},
            {"amount": 20, "received": true, "date": "2025-01-02"}
        ]
    }));

    let early = extract_booking_payments(&record, &HalfSplit, now());
    let later = extract_booking_payments(
        &record,
        &HalfSplit,
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
    );

    assert!(early.received_payments[0].date_is_fallback);
    assert_eq!(early.received_payments[0].date, now());
    assert!(!early.received_payments[1].date_is_fallback);
    assert_eq!(early.total_paid, later.total_paid);
    assert_eq!(early.total_outstanding, later.total_outstanding);
}

#[rstest]
#[case(json!({"amount": 100, "paymentStatus": "paid"}), dec!(100), dec!(100), dec!(0))]
#[case(json!({"amount": 100, "paymentStatus": "unpaid"}), dec!(100), dec!(0), dec!(100))]
#[case(json!({"amount": 100, "paymentStatus": "partially_paid"}), dec!(100), dec!(50), dec!(50))]
#[case(json!({"amount": 100}), dec!(100), dec!(0), dec!(100))]
#[case(json!({"amount_total": "1.250,50", "paymentStatus": "paid"}), dec!(1250.50), dec!(1250.50), dec!(0))]
#[case(json!({"amount": null, "amount_total": 30, "paymentStatus": "unpaid"}), dec!(30), dec!(0), dec!(30))]
#[case(
    json!({"amount": 100, "paymentStatus": "partially_paid", "paymentDetails": {"amountPaid": 30, "amountDue": 70}}),
    dec!(100), dec!(30), dec!(70)
)]
#[case(
    json!({"amount": 100, "paymentStatus": "paid", "paymentDetails": {"amountPaid": 0, "amountDue": 0}}),
    dec!(100), dec!(100), dec!(0)
)]
#[case(
    json!({"amount": 100, "paymentStatus": "unpaid", "paymentDetails": {}}),
    dec!(100), dec!(0), dec!(100)
)]
#[case(
    json!({"amount": 100, "paymentStatus": "partially_paid", "paymentDetails": {"amountPaid": 40}}),
    dec!(100), dec!(40), dec!(60)
)]
#[case(
    json!({"amount": 100, "paymentStatus": "partially_paid", "paymentDetails": {"amountPaid": 0, "amountDue": 0}}),
    dec!(100), dec!(0), dec!(100)
)]
#[case(json!({}), dec!(0), dec!(0), dec!(0))]
fn test_order_extraction(
    #[case] input: serde_json::Value,
    #[case] total: Decimal,
    #[case] paid: Decimal,
    #[case] due: Decimal,
) {
    let result = extract_order_payments(&order(input), &HalfSplit);

    assert_eq!(result.total_amount.as_decimal(), total);
    assert_eq!(result.amount_paid.as_decimal(), paid);
    assert_eq!(result.amount_due.as_decimal(), due);
}

#[test]
fn test_order_partial_uses_policy() {
    let record = order(json!({"amount": 80, "paymentStatus": "partial"}));
    let policy = FixedRatio::new(dec!(0.75)).unwrap();

    let result = extract_order_payments(&record, &policy);

    assert_eq!(result.amount_paid.as_decimal(), dec!(60));
    assert_eq!(result.amount_due.as_decimal(), dec!(20));
}
