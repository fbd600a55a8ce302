use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tip_core::{PaymentError, PaymentGateway, ReceiptId};
use tracing::debug;

use crate::script::{Outcome, Script};

/// An in-process gateway that answers from a [`Script`].
///
/// Receipt ids count up per approved tip: `sim-000001`, `sim-000002`, ...
pub struct SimulatedGateway {
    script: Script,
    calls: AtomicUsize,
    approved: AtomicUsize,
}

impl SimulatedGateway {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            approved: AtomicUsize::new(0),
        }
    }

    /// Number of `send_tip` calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(Script::default())
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn send_tip(
        &self,
        amount_minor_units: i64,
        method: &str,
    ) -> Result<ReceiptId, PaymentError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.script.latency.is_zero() {
            tokio::time::sleep(self.script.latency).await;
        }

        let outcome = self.script.outcome(call);
        debug!(call, amount_minor_units, method, ?outcome, "simulated gateway");
        match outcome {
            Outcome::Approve => {
                let n = self.approved.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(ReceiptId::new(format!("sim-{n:06}")))
            }
            Outcome::Decline => Err(PaymentError::Declined(format!(
                "{method} refused {amount_minor_units} minor units"
            ))),
            Outcome::Offline => Err(PaymentError::NetworkUnavailable),
            Outcome::Timeout => Err(PaymentError::Timeout),
        }
    }
}
