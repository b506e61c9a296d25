//! Monetary amount type with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision. The only
//! place an `f64` appears is [`MonetaryAmount::to_rounded_f64`], which produces
//! a display mirror from an already-rounded decimal.

use std::iter::Sum;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// An immutable, exact decimal amount of money.
///
/// Amounts used as magnitudes are non-negative by convention; only signed
/// deltas such as net profit go below zero.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MonetaryAmount(Decimal);

impl MonetaryAmount {
    /// Exact zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates an amount from a decimal value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Returns the underlying decimal.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Adds `rhs`, returning `None` when the sum leaves the decimal range.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Subtracts `rhs`, returning `None` when the difference leaves the decimal range.
    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Divides by `divisor` and rounds the quotient to `scale` fractional digits.
    ///
    /// Returns `None` when the divisor is zero or the quotient overflows.
    #[must_use]
    pub fn checked_div_scaled(&self, divisor: Decimal, scale: u32) -> Option<Self> {
        self.0
            .checked_div(divisor)
            .map(|q| Self(q.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)))
    }

    /// Rounds to the number of digits of the given preset.
    #[must_use]
    pub fn round(&self, preset: RoundingPreset) -> Self {
        Self(round_half_up(self.0, preset.decimal_places()))
    }

    /// Plain-number mirror rounded with the given preset.
    #[must_use]
    pub fn to_rounded_f64(&self, preset: RoundingPreset) -> f64 {
        self.round(preset).0.to_f64().unwrap_or_default()
    }
}

/// Rounds half away from zero, the convention used for every displayed figure.
#[must_use]
pub fn round_half_up(value: Decimal, decimal_places: u32) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

impl From<Decimal> for MonetaryAmount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<MonetaryAmount> for Decimal {
    fn from(value: MonetaryAmount) -> Self {
        value.0
    }
}

// Operators saturate at the decimal bounds instead of panicking. Use the
// `checked_*` methods to detect overflow.
impl Add for MonetaryAmount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for MonetaryAmount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Mul<Decimal> for MonetaryAmount {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0.saturating_mul(rhs))
    }
}

impl Sum for MonetaryAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a MonetaryAmount> for MonetaryAmount {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl std::fmt::Display for MonetaryAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named rounding presets for plain-number mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingPreset {
    /// Currency contexts: 2 fractional digits.
    Currency,
    /// Intermediate ratios: up to 8 fractional digits.
    Ratio,
}

impl RoundingPreset {
    /// Number of fractional digits kept by this preset.
    #[must_use]
    pub const fn decimal_places(self) -> u32 {
        match self {
            Self::Currency => 2,
            Self::Ratio => 8,
        }
    }
}

/// Named precision presets for percentages.
///
/// Dashboard badges show one digit, reports show two. Both are kept as
/// explicit options instead of a single silent default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentPrecision {
    /// One fractional digit.
    Dashboard,
    /// Two fractional digits.
    #[default]
    Report,
    /// Caller-chosen digit count.
    Custom(u32),
}

impl PercentPrecision {
    /// Number of fractional digits.
    #[must_use]
    pub const fn digits(self) -> u32 {
        match self {
            Self::Dashboard => 1,
            Self::Report => 2,
            Self::Custom(digits) => digits,
        }
    }
}

/// ISO 4217 currency code, stored upper-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// Euro, the documented default.
    pub const EUR: Self = Self(*b"EUR");
    /// US Dollar.
    pub const USD: Self = Self(*b"USD");
    /// Pound Sterling.
    pub const GBP: Self = Self(*b"GBP");

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Constructed only from ASCII letters.
        std::str::from_utf8(&self.0).unwrap_or("XXX")
    }

    /// Display symbol, when the currency has a well-known one.
    #[must_use]
    pub fn symbol(&self) -> Option<&'static str> {
        match &self.0 {
            b"EUR" => Some("€"),
            b"USD" => Some("$"),
            b"GBP" => Some("£"),
            b"JPY" => Some("¥"),
            b"CHF" => Some("CHF"),
            _ => None,
        }
    }

    /// Digits after the decimal point in display (ISO 4217 minor units).
    #[must_use]
    pub fn minor_units(&self) -> u32 {
        match &self.0 {
            b"JPY" | b"KRW" | b"ISK" | b"CLP" | b"VND" => 0,
            _ => 2,
        }
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::EUR
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(AppError::InvalidCurrency(s.to_string()));
        }
        let mut code = [0u8; 3];
        for (slot, byte) in code.iter_mut().zip(bytes) {
            *slot = byte.to_ascii_uppercase();
        }
        Ok(Self(code))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.as_str().to_string()
    }
}
