//! Common types used across the workspace.

pub mod id;
pub mod locale;
pub mod money;

pub use id::*;
pub use locale::{DEFAULT_LOCALE, DisplayLocale, NumberStyle};
pub use money::{CurrencyCode, MonetaryAmount, PercentPrecision, RoundingPreset, round_half_up};
