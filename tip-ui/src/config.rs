//! Settings file for the tipping screen.
//!
//! Every key is optional; anything missing falls back to the stock screen
//! (presets 3/5/7, Apple Pay / PayPal / SEPA, minimum hint 0.50 €, the
//! simulated gateway approving every tip).
//!
//! ```toml
//! presets = ["2", "4", "6"]
//! payment_methods = ["Apple Pay", "PayPal", "SEPA"]
//! default_payment_method = "PayPal"
//! minimum_amount = "0.50"
//! currency_symbol = "€"
//! initial_preset = 0
//!
//! [gateway]
//! backend = "simulated"
//! connection_string = "offline,approve,latency=300"
//!
//! [retry]
//! max_attempts = 3
//! initial_backoff_ms = 200
//! request_timeout_ms = 10000
//! ```

use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tip_core::gateway::GatewayConfig;
use tip_core::{RetryPolicy, Suggestion, TipConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewaySettings {
    pub backend: String,
    pub connection_string: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        let config = GatewayConfig::default();
        Self {
            backend: config.backend,
            connection_string: config.connection_string,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_backoff_ms: policy.initial_backoff.as_millis() as u64,
            request_timeout_ms: policy.request_timeout.as_millis() as u64,
        }
    }
}

/// Raw contents of the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub presets: Vec<String>,
    pub payment_methods: Vec<String>,
    pub default_payment_method: String,
    pub minimum_amount: Decimal,
    pub currency_symbol: String,
    pub initial_preset: Option<u32>,
    pub gateway: GatewaySettings,
    pub retry: RetrySettings,
}

impl Default for Settings {
    fn default() -> Self {
        let tip = TipConfig::default();
        Self {
            presets: tip.suggestions.into_iter().map(|s| s.amount).collect(),
            payment_methods: tip.payment_methods,
            default_payment_method: tip.default_payment_method,
            minimum_amount: tip.minimum_amount,
            currency_symbol: tip.currency_symbol,
            initial_preset: tip.initial_preset,
            gateway: GatewaySettings::default(),
            retry: RetrySettings::default(),
        }
    }
}

impl Settings {
    /// Reads and validates a settings file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rules:
    /// - at least one preset, none of them blank
    /// - at least one payment method, and the default must be one of them
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.presets.is_empty() {
            errors.push("at least one preset is required".to_string());
        }
        if self.presets.iter().any(|p| p.trim().is_empty()) {
            errors.push("presets must not be blank".to_string());
        }
        if self.payment_methods.is_empty() {
            errors.push("at least one payment method is required".to_string());
        } else if !self
            .payment_methods
            .iter()
            .any(|m| m == &self.default_payment_method)
        {
            errors.push(format!(
                "default payment method '{}' is not in {:?}",
                self.default_payment_method, self.payment_methods
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors.join("; ")))
        }
    }

    pub fn tip_config(&self) -> TipConfig {
        TipConfig {
            suggestions: Suggestion::from_amounts(&self.presets),
            payment_methods: self.payment_methods.clone(),
            default_payment_method: self.default_payment_method.clone(),
            minimum_amount: self.minimum_amount,
            currency_symbol: self.currency_symbol.clone(),
            initial_preset: self.initial_preset,
            retry: RetryPolicy {
                max_attempts: self.retry.max_attempts,
                initial_backoff: Duration::from_millis(self.retry.initial_backoff_ms),
                request_timeout: Duration::from_millis(self.retry.request_timeout_ms),
            },
        }
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            backend: self.gateway.backend.clone(),
            connection_string: self.gateway.connection_string.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn empty_file_gives_stock_screen() {
        let settings = Settings::parse("").unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.tip_config(), TipConfig::default());
        assert_eq!(settings.gateway_config(), GatewayConfig::default());
    }

    #[test]
    fn full_file_is_mapped() {
        let settings = Settings::parse(
            r#"
            presets = ["2", "4.50"]
            payment_methods = ["PayPal", "SEPA"]
            default_payment_method = "SEPA"
            minimum_amount = "1.00"
            currency_symbol = "$"
            initial_preset = 1

            [gateway]
            backend = "simulated"
            connection_string = "decline"

            [retry]
            max_attempts = 5
            initial_backoff_ms = 10
            request_timeout_ms = 250
            "#,
        )
        .unwrap();

        let tip = settings.tip_config();
        assert_eq!(tip.suggestions, Suggestion::from_amounts(&["2", "4.50"]));
        assert_eq!(tip.default_payment_method, "SEPA");
        assert_eq!(tip.minimum_amount, dec!(1.00));
        assert_eq!(tip.currency_symbol, "$");
        assert_eq!(tip.initial_preset, Some(1));
        assert_eq!(tip.retry.max_attempts, 5);
        assert_eq!(tip.retry.initial_backoff, Duration::from_millis(10));
        assert_eq!(tip.retry.request_timeout, Duration::from_millis(250));
        assert_eq!(settings.gateway_config().connection_string, "decline");
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let settings = Settings::parse("[retry]\nmax_attempts = 1\n").unwrap();

        assert_eq!(settings.retry.max_attempts, 1);
        assert_eq!(settings.retry.request_timeout_ms, 10_000);
        assert_eq!(settings.presets, vec!["3", "5", "7"]);
    }

    #[test]
    fn default_method_must_be_listed() {
        let err = Settings::parse(
            r#"
            payment_methods = ["PayPal"]
            default_payment_method = "Cash"
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("Cash")));
    }

    #[test]
    fn blank_presets_are_rejected() {
        assert!(matches!(
            Settings::parse("presets = [\"3\", \" \"]"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Settings::parse("presets = []"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            Settings::parse("tip_jar = true"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_names_path() {
        let err = Settings::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
