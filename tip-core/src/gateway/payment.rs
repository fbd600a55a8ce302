use async_trait::async_trait;
use thiserror::Error;

use crate::models::ReceiptId;

/// Why a tip could not be sent. Every variant leaves the composed amount in
/// place so the user can try again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("Network unavailable")]
    NetworkUnavailable,

    #[error("Payment declined: {0}")]
    Declined(String),

    #[error("Payment timed out")]
    Timeout,
}

impl PaymentError {
    /// Failures worth retrying without asking the user.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NetworkUnavailable | Self::Timeout)
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge `amount_minor_units` (cents) with the named payment method.
    async fn send_tip(
        &self,
        amount_minor_units: i64,
        method: &str,
    ) -> Result<ReceiptId, PaymentError>;
}
