//! Parsing of loosely-represented amounts into exact decimals.
//!
//! The string rules must stay stable: historical records were written by
//! clients in several locales and are re-read with exactly these rules.

use std::str::FromStr;

use keel_shared::types::MonetaryAmount;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An amount exactly as a source record carried it.
///
/// Absent fields deserialize to `Null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawAmount(Value);

impl RawAmount {
    /// A missing amount.
    pub const MISSING: Self = Self(Value::Null);

    /// Returns true when the source supplied any non-null value.
    #[must_use]
    pub fn is_present(&self) -> bool {
        !self.0.is_null()
    }

    /// Normalizes this amount.
    #[must_use]
    pub fn normalize(&self) -> MonetaryAmount {
        normalize(self)
    }
}

impl From<Value> for RawAmount {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}

impl From<String> for RawAmount {
    fn from(value: String) -> Self {
        Self(Value::String(value))
    }
}

impl From<i64> for RawAmount {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

/// Non-finite floats become a missing amount.
impl From<f64> for RawAmount {
    fn from(value: f64) -> Self {
        Self(serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number))
    }
}

impl From<Decimal> for RawAmount {
    fn from(value: Decimal) -> Self {
        Self(Value::String(value.to_string()))
    }
}

impl From<MonetaryAmount> for RawAmount {
    fn from(value: MonetaryAmount) -> Self {
        value.as_decimal().into()
    }
}

impl<T: Into<RawAmount>> From<Option<T>> for RawAmount {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::MISSING, Into::into)
    }
}

/// Normalizes any representation of a monetary value.
///
/// Never fails: null, empty, non-finite, and unparseable input all yield
/// exact zero.
#[must_use]
pub fn normalize(raw: &RawAmount) -> MonetaryAmount {
    let parsed = match &raw.0 {
        Value::Null => None,
        Value::Number(number) => parse_number(number),
        Value::String(text) => parse_text(text),
        other => {
            tracing::debug!(value = %other, "amount is not a number or string, using zero");
            None
        }
    };
    MonetaryAmount::new(canonical_zero(parsed.unwrap_or_default()))
}

/// Normalizes a free-form string.
#[must_use]
pub fn normalize_str(text: &str) -> MonetaryAmount {
    MonetaryAmount::new(canonical_zero(parse_text(text).unwrap_or_default()))
}

fn canonical_zero(value: Decimal) -> Decimal {
    if value.is_zero() { Decimal::ZERO } else { value }
}

fn parse_number(number: &serde_json::Number) -> Option<Decimal> {
    if let Some(n) = number.as_i64() {
        return Some(Decimal::from(n));
    }
    if let Some(n) = number.as_u64() {
        return Some(Decimal::from(n));
    }
    // The shortest round-trip text of the float is the value the source meant.
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
        .or_else(|| number.as_f64().and_then(Decimal::from_f64))
}

fn parse_text(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let unified = unify_separators(&cleaned);
    let parsed = parse_leading_decimal(&unified);
    if parsed.is_none() {
        tracing::debug!(input = text, "unparseable amount, using zero");
    }
    parsed
}

/// Rewrites the cleaned string so `.` is the only decimal separator.
fn unify_separators(cleaned: &str) -> String {
    let last_dot = cleaned.rfind('.');
    let last_comma = cleaned.rfind(',');

    match (last_dot, last_comma) {
        (Some(dot), Some(comma)) if comma > dot => {
            // 1.234,56: comma is the decimal point.
            replace_last_comma_dropping_rest(&cleaned.replace('.', ""))
        }
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (None, Some(comma)) if cleaned.len() - comma <= 3 => {
            replace_last_comma_dropping_rest(cleaned)
        }
        (None, Some(_)) => cleaned.replace(',', ""),
        _ => cleaned.to_string(),
    }
}

fn replace_last_comma_dropping_rest(text: &str) -> String {
    let Some(last) = text.rfind(',') else {
        return text.to_string();
    };
    let mut out = String::with_capacity(text.len());
    for (i, ch) in text.char_indices() {
        match ch {
            ',' if i == last => out.push('.'),
            ',' => {}
            other => out.push(other),
        }
    }
    out
}

/// Reads the longest numeric prefix: optional `-`, digits, optional fraction.
/// Anything after it is ignored, mirroring lenient float parsing.
fn parse_leading_decimal(text: &str) -> Option<Decimal> {
    let bytes = text.as_bytes();
    let mut pos = 0;
    let negative = bytes.first() == Some(&b'-');
    if negative {
        pos = 1;
    }

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_digits = &text[int_start..pos];

    let mut frac_digits = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        frac_digits = &text[frac_start..frac_end];
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    let mut literal = String::with_capacity(int_digits.len() + frac_digits.len() + 3);
    if negative {
        literal.push('-');
    }
    literal.push_str(if int_digits.is_empty() { "0" } else { int_digits });
    if !frac_digits.is_empty() {
        literal.push('.');
        literal.push_str(frac_digits);
    }
    Decimal::from_str(&literal).ok()
}
