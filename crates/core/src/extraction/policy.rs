//! Estimation of received/pending shares for partially paid orders.

use keel_shared::types::MonetaryAmount;
use rust_decimal::Decimal;

/// Received and pending shares of one amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialSplit {
    /// Share assumed received.
    pub received: MonetaryAmount,
    /// Share assumed still pending.
    pub pending: MonetaryAmount,
}

/// Decides how much of a partially paid order has been received when the
/// record carries no granular payment data.
///
/// Implementations must return shares that add up to the original amount.
pub trait PartialPaymentPolicy: std::fmt::Debug + Send + Sync {
    /// Splits `amount` into received and pending shares.
    fn split(&self, amount: MonetaryAmount) -> PartialSplit;
}

/// Exactly half received, half pending.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalfSplit;

impl PartialPaymentPolicy for HalfSplit {
    fn split(&self, amount: MonetaryAmount) -> PartialSplit {
        let received = MonetaryAmount::new(amount.as_decimal() / Decimal::TWO);
        PartialSplit {
            received,
            pending: amount - received,
        }
    }
}

/// A fixed share received, the remainder pending.
#[derive(Debug, Clone, Copy)]
pub struct FixedRatio {
    ratio: Decimal,
}

impl FixedRatio {
    /// Creates a policy receiving `ratio` of each amount.
    ///
    /// Returns `None` unless `0 <= ratio <= 1`.
    #[must_use]
    pub fn new(ratio: Decimal) -> Option<Self> {
        (Decimal::ZERO..=Decimal::ONE)
            .contains(&ratio)
            .then_some(Self { ratio })
    }

    /// The received share.
    #[must_use]
    pub const fn ratio(&self) -> Decimal {
        self.ratio
    }
}

impl PartialPaymentPolicy for FixedRatio {
    fn split(&self, amount: MonetaryAmount) -> PartialSplit {
        let received = amount * self.ratio;
        PartialSplit {
            received,
            pending: amount - received,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_half_split_is_exact() {
        let split = HalfSplit.split(MonetaryAmount::new(dec!(100.01)));
        assert_eq!(split.received.as_decimal(), dec!(50.005));
        assert_eq!(split.pending.as_decimal(), dec!(50.005));
    }

    #[test]
    fn test_fixed_ratio_bounds() {
        assert!(FixedRatio::new(dec!(-0.1)).is_none());
        assert!(FixedRatio::new(dec!(1.01)).is_none());
        assert_eq!(FixedRatio::new(dec!(1)).map(|p| p.ratio()), Some(dec!(1)));
    }

    #[test]
    fn test_fixed_ratio_split_sums_to_amount() {
        let policy = FixedRatio::new(dec!(0.3)).unwrap();
        let amount = MonetaryAmount::new(dec!(250));
        let split = policy.split(amount);
        assert_eq!(split.received.as_decimal(), dec!(75));
        assert_eq!(split.pending.as_decimal(), dec!(175));
        assert_eq!(split.received + split.pending, amount);
    }
}
