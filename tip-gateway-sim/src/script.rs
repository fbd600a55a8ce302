//! Connection-string scripts for the simulated gateway.
//!
//! A script is a comma-separated list of outcomes consumed one per call.
//! The last outcome repeats once the list is exhausted. An optional
//! `latency=<ms>` entry delays every call.
//!
//! | entry          | effect                                    |
//! |----------------|-------------------------------------------|
//! | `approve`      | tip accepted, a receipt id is returned    |
//! | `decline`      | `PaymentError::Declined`                  |
//! | `offline`      | `PaymentError::NetworkUnavailable`        |
//! | `timeout`      | `PaymentError::Timeout`                   |
//! | `latency=<ms>` | sleep before answering                    |
//! | `unreachable`  | the factory refuses to connect            |
//!
//! An empty string means `approve`.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("unknown outcome '{0}'")]
    UnknownOutcome(String),

    #[error("invalid latency '{0}'")]
    InvalidLatency(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Approve,
    Decline,
    Offline,
    Timeout,
}

impl FromStr for Outcome {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "approve" => Ok(Self::Approve),
            "decline" => Ok(Self::Decline),
            "offline" => Ok(Self::Offline),
            "timeout" => Ok(Self::Timeout),
            _ => Err(ScriptError::UnknownOutcome(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub outcomes: Vec<Outcome>,
    pub latency: Duration,
    pub unreachable: bool,
}

impl Script {
    /// Outcome for the zero-based call number `call`.
    pub fn outcome(
        &self,
        call: usize,
    ) -> Outcome {
        self.outcomes
            .get(call)
            .or(self.outcomes.last())
            .copied()
            .unwrap_or(Outcome::Approve)
    }
}

impl Default for Script {
    fn default() -> Self {
        Self {
            outcomes: vec![Outcome::Approve],
            latency: Duration::ZERO,
            unreachable: false,
        }
    }
}

impl FromStr for Script {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut script = Script {
            outcomes: Vec::new(),
            latency: Duration::ZERO,
            unreachable: false,
        };

        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            if let Some(ms) = entry.strip_prefix("latency=") {
                let ms: u64 = ms
                    .trim()
                    .parse()
                    .map_err(|_| ScriptError::InvalidLatency(ms.to_string()))?;
                script.latency = Duration::from_millis(ms);
            } else if entry.eq_ignore_ascii_case("unreachable") {
                script.unreachable = true;
            } else {
                script.outcomes.push(entry.parse()?);
            }
        }

        if script.outcomes.is_empty() {
            script.outcomes.push(Outcome::Approve);
        }
        Ok(script)
    }
}
