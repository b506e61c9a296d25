//! Property-based tests for derived metrics.

use keel_shared::types::{MonetaryAmount, PercentPrecision};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::derived::{PercentageChange, percentage_change, profit_margin};

fn amount() -> impl Strategy<Value = Decimal> {
    (-10_000_000_000i64..10_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn precision() -> impl Strategy<Value = PercentPrecision> {
    prop_oneof![
        Just(PercentPrecision::Dashboard),
        Just(PercentPrecision::Report),
        (0u32..=8).prop_map(PercentPrecision::Custom),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Property: the change magnitude is never negative and carries at most
    /// the requested digits.
    #[test]
    fn prop_change_is_rounded_magnitude(
        current in amount(),
        previous in amount(),
        precision in precision(),
    ) {
        let change = percentage_change(current, previous, precision);
        prop_assert!(change.value >= Decimal::ZERO);
        prop_assert!(change.value.scale() <= precision.digits());
    }

    /// Property: a zero base always yields the zero sentinel.
    #[test]
    fn prop_zero_base_is_sentinel(current in amount(), precision in precision()) {
        prop_assert_eq!(
            percentage_change(current, Decimal::ZERO, precision),
            PercentageChange::ZERO
        );
    }

    /// Property: `is_increase` follows the sign of the difference.
    #[test]
    fn prop_direction_matches_difference(current in amount(), previous in amount()) {
        prop_assume!(!previous.is_zero());
        let change = percentage_change(current, previous, PercentPrecision::Report);
        prop_assert_eq!(change.is_increase, current > previous);
    }

    /// Property: net profit is income minus expenses; no income means no margin.
    #[test]
    fn prop_margin_net_profit(income in amount(), expenses in amount()) {
        let income = MonetaryAmount::new(income);
        let expenses = MonetaryAmount::new(expenses);

        let margin = profit_margin(income, expenses, PercentPrecision::Report);
        prop_assert_eq!(margin.net_profit, income - expenses);

        let none = profit_margin(MonetaryAmount::ZERO, expenses, PercentPrecision::Report);
        prop_assert_eq!(none.margin_percent, Decimal::ZERO);
    }
}
