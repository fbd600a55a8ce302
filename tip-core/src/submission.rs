//! Submission flow: composing a tip, sending it, and the success screen.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::gateway::payment::PaymentError;
use crate::models::Receipt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionPhase {
    Composing,
    Sending,
    Submitted(Receipt),
}

impl SubmissionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Composing => "composing",
            Self::Sending => "sending",
            Self::Submitted(_) => "submitted",
        }
    }

    /// The receipt shown on the success screen.
    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            Self::Submitted(receipt) => Some(receipt),
            _ => None,
        }
    }
}

impl fmt::Display for SubmissionPhase {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("cannot {action} while {from}")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },
}

/// Screen-level submission state plus the banner shown after a failed send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionState {
    phase: SubmissionPhase,
    last_error: Option<PaymentError>,
}

impl Default for SubmissionState {
    fn default() -> Self {
        Self {
            phase: SubmissionPhase::Composing,
            last_error: None,
        }
    }
}

impl SubmissionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &SubmissionPhase {
        &self.phase
    }

    pub fn last_error(&self) -> Option<&PaymentError> {
        self.last_error.as_ref()
    }

    pub fn is_composing(&self) -> bool {
        self.phase == SubmissionPhase::Composing
    }

    pub fn is_sending(&self) -> bool {
        self.phase == SubmissionPhase::Sending
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.phase, SubmissionPhase::Submitted(_))
    }

    /// Composing -> Sending. Clears any previous banner.
    pub fn begin(&mut self) -> Result<(), SubmissionError> {
        self.require(SubmissionPhase::Composing, "send")?;
        self.last_error = None;
        self.move_to(SubmissionPhase::Sending);
        Ok(())
    }

    /// Sending -> Submitted.
    pub fn succeed(
        &mut self,
        receipt: Receipt,
    ) -> Result<(), SubmissionError> {
        self.require(SubmissionPhase::Sending, "complete")?;
        self.move_to(SubmissionPhase::Submitted(receipt));
        Ok(())
    }

    /// Sending -> Composing with `error` kept for the banner.
    pub fn fail(
        &mut self,
        error: PaymentError,
    ) -> Result<(), SubmissionError> {
        self.require(SubmissionPhase::Sending, "fail")?;
        self.last_error = Some(error);
        self.move_to(SubmissionPhase::Composing);
        Ok(())
    }

    /// Sending -> Composing without a banner.
    pub fn abort(&mut self) -> Result<(), SubmissionError> {
        self.require(SubmissionPhase::Sending, "abort")?;
        self.move_to(SubmissionPhase::Composing);
        Ok(())
    }

    /// Submitted -> Composing.
    pub fn back(&mut self) -> Result<(), SubmissionError> {
        if !self.is_submitted() {
            return Err(SubmissionError::InvalidTransition {
                from: self.phase.name(),
                action: "go back",
            });
        }
        self.move_to(SubmissionPhase::Composing);
        Ok(())
    }

    /// Drops the banner without changing phase.
    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    fn require(
        &self,
        expected: SubmissionPhase,
        action: &'static str,
    ) -> Result<(), SubmissionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SubmissionError::InvalidTransition {
                from: self.phase.name(),
                action,
            })
        }
    }

    fn move_to(
        &mut self,
        next: SubmissionPhase,
    ) {
        debug!(from = self.phase.name(), to = next.name(), "submission phase");
        self.phase = next;
    }
}
