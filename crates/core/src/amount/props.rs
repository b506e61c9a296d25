//! Property-based tests for amount normalization.

use keel_shared::types::{DisplayLocale, MonetaryAmount};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::normalize::{RawAmount, normalize, normalize_str};

/// Strategy to generate amounts from -1,000,000.00 to 1,000,000.00.
fn signed_amount() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate non-negative amounts with at least one grouping separator.
fn grouped_amount() -> impl Strategy<Value = Decimal> {
    (100_000i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Summation is associative and commutative.
    #[test]
    fn prop_sum_associative_commutative(
        a in signed_amount(),
        b in signed_amount(),
        c in signed_amount(),
    ) {
        let (a, b, c) = (MonetaryAmount::new(a), MonetaryAmount::new(b), MonetaryAmount::new(c));
        prop_assert_eq!((a + b) + c, a + (b + c));
        prop_assert_eq!(a + b, b + a);
        prop_assert_eq!([a, b, c].iter().sum::<MonetaryAmount>(), [c, a, b].iter().sum::<MonetaryAmount>());
    }

    /// English and continental renderings of the same value agree.
    #[test]
    fn prop_locale_renderings_agree(value in grouped_amount()) {
        let english: DisplayLocale = "en-US".parse().unwrap();
        let german: DisplayLocale = "de-DE".parse().unwrap();

        let from_english = normalize_str(&english.format_number(value, 2));
        let from_german = normalize_str(&german.format_number(value, 2));

        prop_assert_eq!(from_english.as_decimal(), value);
        prop_assert_eq!(from_german.as_decimal(), value);
    }

    /// Canonical decimals survive normalization unchanged.
    #[test]
    fn prop_canonical_is_fixed_point(value in signed_amount()) {
        let amount = MonetaryAmount::new(value);
        prop_assert_eq!(normalize(&RawAmount::from(amount)), amount);
    }

    /// Arbitrary text never panics and never yields a non-finite value.
    #[test]
    fn prop_normalize_is_total(text in ".{0,40}") {
        let _ = normalize_str(&text);
    }
}
