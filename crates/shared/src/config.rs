//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::types::{CurrencyCode, DEFAULT_LOCALE, DisplayLocale, PercentPrecision};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Reconciliation defaults.
    #[serde(default)]
    pub reconciliation: ReconciliationSettings,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings passed explicitly into the reconciliation engine.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationSettings {
    /// Locale tag used for display strings.
    #[serde(default = "default_locale")]
    pub locale: String,
    /// ISO 4217 currency code used for display strings.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Share of a partially paid order assumed received when no
    /// granular payment data exists.
    #[serde(default = "default_partial_payment_ratio")]
    pub partial_payment_ratio: Decimal,
    /// Digits used for percentages in the report.
    #[serde(default)]
    pub percent_precision: PercentPrecision,
    /// Fold booking and order collections on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_currency() -> String {
    CurrencyCode::EUR.to_string()
}

fn default_partial_payment_ratio() -> Decimal {
    Decimal::new(5, 1)
}

fn default_parallel() -> bool {
    true
}

impl Default for ReconciliationSettings {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            currency: default_currency(),
            partial_payment_ratio: default_partial_payment_ratio(),
            percent_precision: PercentPrecision::default(),
            parallel: default_parallel(),
        }
    }
}

impl ReconciliationSettings {
    /// Parses the configured currency code.
    pub fn currency_code(&self) -> AppResult<CurrencyCode> {
        self.currency.parse()
    }

    /// Parses the configured locale.
    pub fn display_locale(&self) -> AppResult<DisplayLocale> {
        self.locale.parse()
    }

    /// Checks every setting that can be wrong.
    pub fn validate(&self) -> AppResult<()> {
        self.currency_code()?;
        self.display_locale()?;
        if self.partial_payment_ratio < Decimal::ZERO || self.partial_payment_ratio > Decimal::ONE {
            return Err(AppError::Validation(format!(
                "partial_payment_ratio must be between 0 and 1, got {}",
                self.partial_payment_ratio
            )));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "keel=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or fails validation.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("KEEL").separator("__"))
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.reconciliation.validate()?;
        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.reconciliation.locale, "en-US");
        assert_eq!(config.reconciliation.currency, "EUR");
        assert_eq!(config.reconciliation.partial_payment_ratio, dec!(0.5));
        assert_eq!(
            config.reconciliation.percent_precision,
            PercentPrecision::Report
        );
        assert!(config.reconciliation.parallel);
        assert_eq!(config.logging.filter, "keel=info");
        assert!(!config.logging.json);
        assert!(config.reconciliation.validate().is_ok());
    }

    #[test]
    fn test_load_without_sources_uses_defaults() {
        temp_env::with_vars_unset(
            [
                "KEEL__RECONCILIATION__LOCALE",
                "KEEL__RECONCILIATION__CURRENCY",
                "RUN_MODE",
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.reconciliation.currency, "EUR");
                assert_eq!(config.reconciliation.locale, "en-US");
            },
        );
    }

    #[test]
    fn test_load_env_override() {
        temp_env::with_vars(
            [
                ("KEEL__RECONCILIATION__LOCALE", Some("el-GR")),
                ("KEEL__RECONCILIATION__CURRENCY", Some("usd")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.reconciliation.locale, "el-GR");
                assert_eq!(
                    config.reconciliation.currency_code().unwrap(),
                    CurrencyCode::USD
                );
            },
        );
    }

    #[test]
    fn test_load_rejects_bad_currency() {
        temp_env::with_var("KEEL__RECONCILIATION__CURRENCY", Some("EURO"), || {
            let err = AppConfig::load().unwrap_err();
            assert_eq!(err.error_code(), "INVALID_CURRENCY");
        });
    }

    #[test]
    fn test_validate_ratio_bounds() {
        let mut settings = ReconciliationSettings::default();
        settings.partial_payment_ratio = dec!(1.5);
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        settings.partial_payment_ratio = dec!(-0.1);
        assert!(matches!(settings.validate(), Err(AppError::Validation(_))));

        settings.partial_payment_ratio = dec!(0);
        assert!(settings.validate().is_ok());
    }
}
