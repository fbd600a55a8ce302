use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Suggestion;

/// How a session retries transient gateway failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Pause before the second attempt; doubled after every retry.
    pub initial_backoff: Duration,
    /// Upper bound for a single gateway call.
    pub request_timeout: Duration,
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn no_retry(request_timeout: Duration) -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            request_timeout,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Everything a tipping screen is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipConfig {
    pub suggestions: Vec<Suggestion>,
    pub payment_methods: Vec<String>,
    pub default_payment_method: String,
    /// Shown to the user as a hint; never enforced.
    pub minimum_amount: Decimal,
    pub currency_symbol: String,
    /// Preset to select when the screen opens, if any.
    pub initial_preset: Option<u32>,
    pub retry: RetryPolicy,
}

impl Default for TipConfig {
    fn default() -> Self {
        Self {
            suggestions: Suggestion::defaults(),
            payment_methods: vec![
                "Apple Pay".to_string(),
                "PayPal".to_string(),
                "SEPA".to_string(),
            ],
            default_payment_method: "Apple Pay".to_string(),
            minimum_amount: Decimal::new(50, 2),
            currency_symbol: "€".to_string(),
            initial_preset: None,
            retry: RetryPolicy::default(),
        }
    }
}
