//! Locale-aware display formatting for amounts and percentages.
//!
//! Only the number conventions a dashboard needs are modeled: grouping
//! separator, decimal separator, and where the currency symbol goes. Unknown
//! language tags fall back to the English style.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::{CurrencyCode, MonetaryAmount, round_half_up};
use crate::error::AppError;

/// Documented default locale tag.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Number formatting convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberStyle {
    /// `€1,234.56`
    English,
    /// `1.234,56 €`
    Continental,
    /// `1 234,56 €` (narrow no-break space grouping)
    French,
    /// `CHF 1'234.56`
    Swiss,
}

impl NumberStyle {
    const fn group_separator(self) -> &'static str {
        match self {
            Self::English => ",",
            Self::Continental => ".",
            Self::French => "\u{202f}",
            Self::Swiss => "'",
        }
    }

    const fn decimal_separator(self) -> char {
        match self {
            Self::English | Self::Swiss => '.',
            Self::Continental | Self::French => ',',
        }
    }

    const fn symbol_after(self) -> bool {
        matches!(self, Self::Continental | Self::French)
    }
}

/// A validated locale tag with its resolved number style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayLocale {
    tag: String,
    style: NumberStyle,
}

impl DisplayLocale {
    /// The locale tag as supplied (normalized to `-` separators).
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The resolved number style.
    #[must_use]
    pub const fn style(&self) -> NumberStyle {
        self.style
    }

    /// Formats a monetary amount with the currency's minor units.
    #[must_use]
    pub fn format_currency(&self, amount: MonetaryAmount, currency: CurrencyCode) -> String {
        let number = self.format_number(amount.as_decimal(), currency.minor_units());
        let (negative, digits) = match number.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, number.as_str()),
        };
        let sign = if negative { "-" } else { "" };

        match currency.symbol() {
            Some(symbol) if self.style.symbol_after() => format!("{sign}{digits}\u{a0}{symbol}"),
            Some(symbol) if symbol.len() > 1 && symbol.is_ascii() => {
                format!("{sign}{symbol}\u{a0}{digits}")
            }
            Some(symbol) => format!("{sign}{symbol}{digits}"),
            None if self.style.symbol_after() => format!("{sign}{digits}\u{a0}{currency}"),
            None => format!("{sign}{currency}\u{a0}{digits}"),
        }
    }

    /// Formats a percentage value (already scaled to 0..100) with `digits` decimals.
    #[must_use]
    pub fn format_percent(&self, value: Decimal, digits: u32) -> String {
        let number = self.format_number(value, digits);
        if self.style.symbol_after() {
            format!("{number}\u{a0}%")
        } else {
            format!("{number}%")
        }
    }

    /// Formats a plain number with grouping and exactly `digits` decimals.
    #[must_use]
    pub fn format_number(&self, value: Decimal, digits: u32) -> String {
        let mut rounded = round_half_up(value, digits);
        rounded.rescale(digits);
        let text = rounded.abs().to_string();
        let (int_part, frac_part) = match text.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (text.as_str(), None),
        };

        let mut out = String::with_capacity(text.len() + text.len() / 3 + 1);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            out.push('-');
        }
        out.push_str(&group_digits(int_part, self.style.group_separator()));
        if let Some(frac) = frac_part {
            out.push(self.style.decimal_separator());
            out.push_str(frac);
        }
        out
    }
}

fn group_digits(int_part: &str, separator: &str) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

fn resolve_style(tag: &str) -> NumberStyle {
    let lower = tag.to_ascii_lowercase();
    if lower == "de-ch" || lower == "fr-ch" || lower == "it-ch" {
        return NumberStyle::Swiss;
    }
    match lower.split('-').next().unwrap_or_default() {
        "de" | "el" | "it" | "es" | "nl" | "pt" | "hr" | "sl" | "tr" | "id" => {
            NumberStyle::Continental
        }
        "fr" => NumberStyle::French,
        _ => NumberStyle::English,
    }
}

impl Default for DisplayLocale {
    fn default() -> Self {
        Self {
            tag: DEFAULT_LOCALE.to_string(),
            style: NumberStyle::English,
        }
    }
}

impl FromStr for DisplayLocale {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().replace('_', "-");
        let well_formed = !tag.is_empty()
            && tag
                .split('-')
                .all(|part| !part.is_empty() && part.len() <= 8 && part.chars().all(|c| c.is_ascii_alphanumeric()));
        if !well_formed {
            return Err(AppError::InvalidLocale(s.to_string()));
        }
        let style = resolve_style(&tag);
        Ok(Self { tag, style })
    }
}

impl TryFrom<String> for DisplayLocale {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DisplayLocale> for String {
    fn from(value: DisplayLocale) -> Self {
        value.tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn locale(tag: &str) -> DisplayLocale {
        tag.parse().unwrap()
    }

    #[rstest]
    #[case("en-US", NumberStyle::English)]
    #[case("el_GR", NumberStyle::Continental)]
    #[case("de-DE", NumberStyle::Continental)]
    #[case("fr-FR", NumberStyle::French)]
    #[case("de-CH", NumberStyle::Swiss)]
    #[case("sv-SE", NumberStyle::English)]
    fn test_style_resolution(#[case] tag: &str, #[case] style: NumberStyle) {
        assert_eq!(locale(tag).style(), style);
    }

    #[test]
    fn test_invalid_locale() {
        assert!("".parse::<DisplayLocale>().is_err());
        assert!("en--US".parse::<DisplayLocale>().is_err());
        assert!("en US".parse::<DisplayLocale>().is_err());
    }

    #[test]
    fn test_format_currency_english() {
        let amount = MonetaryAmount::new(dec!(1234567.891));
        assert_eq!(
            locale("en-US").format_currency(amount, CurrencyCode::EUR),
            "€1,234,567.89"
        );
        assert_eq!(
            locale("en-US").format_currency(MonetaryAmount::new(dec!(-5)), CurrencyCode::USD),
            "-$5.00"
        );
    }

    #[test]
    fn test_format_currency_continental() {
        let amount = MonetaryAmount::new(dec!(1234.5));
        assert_eq!(
            locale("el-GR").format_currency(amount, CurrencyCode::EUR),
            "1.234,50\u{a0}€"
        );
    }

    #[test]
    fn test_format_currency_without_symbol() {
        let sek: CurrencyCode = "SEK".parse().unwrap();
        assert_eq!(
            locale("en-US").format_currency(MonetaryAmount::new(dec!(10)), sek),
            "SEK\u{a0}10.00"
        );
        let jpy: CurrencyCode = "JPY".parse().unwrap();
        assert_eq!(
            locale("en-US").format_currency(MonetaryAmount::new(dec!(1234.5)), jpy),
            "¥1,235"
        );
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(locale("en-US").format_percent(dec!(70), 2), "70.00%");
        assert_eq!(locale("de-DE").format_percent(dec!(12.345), 1), "12,3\u{a0}%");
    }

    #[test]
    fn test_format_number_small_values() {
        assert_eq!(locale("en-US").format_number(dec!(0.004), 2), "0.00");
        assert_eq!(locale("en-US").format_number(dec!(999), 0), "999");
        assert_eq!(locale("en-US").format_number(dec!(1000), 0), "1,000");
    }
}
