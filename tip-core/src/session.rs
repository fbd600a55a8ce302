//! The tipping screen as a single state container.
//!
//! A [`TipSession`] owns the selection, the submission phase and the chosen
//! payment method. Every mutation publishes a [`TipSnapshot`] on a broadcast
//! channel so a presentation layer can re-render without polling.
//!
//! Only [`TipSession::confirm`] suspends. It races the gateway call (with
//! per-attempt timeout and backoff for transient failures) against a one-shot
//! cancellation signal fired by [`TipSession::cancel`]. The state lock is
//! never held across an await.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, warn};

use crate::amount::{self, AmountError};
use crate::gateway::payment::{PaymentError, PaymentGateway};
use crate::host::ScreenHost;
use crate::models::{Receipt, ReceiptId, Suggestion, TipConfig};
use crate::selection::{SelectionAction, SelectionError, SelectionState, TipAmountResolver};
use crate::submission::{SubmissionError, SubmissionPhase, SubmissionState};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error("Enter or select an amount first")]
    ConfirmDisabled,

    #[error("Not editable while {0}")]
    NotComposing(&'static str),

    #[error("Unknown payment method '{0}'")]
    UnknownPaymentMethod(String),

    #[error("Tip was cancelled")]
    Cancelled,
}

/// Everything a view needs to draw the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipSnapshot {
    pub selection: SelectionState,
    pub phase: SubmissionPhase,
    pub confirm_enabled: bool,
    pub error: Option<String>,
    pub payment_method: String,
    /// The amount parses but is under the displayed minimum. Advisory only.
    pub below_minimum: bool,
}

impl TipSnapshot {
    pub fn is_submitted(&self) -> bool {
        matches!(self.phase, SubmissionPhase::Submitted(_))
    }
}

struct SessionState {
    selection: SelectionState,
    submission: SubmissionState,
    payment_method: String,
    /// Banner for problems found before the gateway was called.
    input_error: Option<String>,
    in_flight: Option<oneshot::Sender<()>>,
}

struct Inner {
    resolver: TipAmountResolver,
    config: TipConfig,
    gateway: Arc<dyn PaymentGateway>,
    host: Arc<dyn ScreenHost>,
    state: Mutex<SessionState>,
    events: broadcast::Sender<TipSnapshot>,
}

/// Cheap to clone; clones share the same screen.
#[derive(Clone)]
pub struct TipSession {
    inner: Arc<Inner>,
}

impl TipSession {
    /// Opens a screen. Applies `config.initial_preset` when it names a
    /// known preset; an unknown one is logged and ignored.
    pub fn new(
        config: TipConfig,
        gateway: Arc<dyn PaymentGateway>,
        host: Arc<dyn ScreenHost>,
    ) -> Self {
        let resolver = TipAmountResolver::new(config.suggestions.clone());
        let selection = match config.initial_preset {
            Some(id) => resolver.select_preset(id).unwrap_or_else(|e| {
                warn!(error = %e, "ignoring initial preset");
                SelectionState::empty()
            }),
            None => SelectionState::empty(),
        };
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let state = SessionState {
            selection,
            submission: SubmissionState::new(),
            payment_method: config.default_payment_method.clone(),
            input_error: None,
            in_flight: None,
        };

        Self {
            inner: Arc::new(Inner {
                resolver,
                config,
                gateway,
                host,
                state: Mutex::new(state),
                events,
            }),
        }
    }

    pub fn config(&self) -> &TipConfig {
        &self.inner.config
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        self.inner.resolver.suggestions()
    }

    /// Receives a snapshot after every change from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<TipSnapshot> {
        self.inner.events.subscribe()
    }

    pub fn snapshot(&self) -> TipSnapshot {
        let state = self.state();
        self.snapshot_of(&state)
    }

    pub fn is_confirm_enabled(&self) -> bool {
        let state = self.state();
        state.submission.is_composing() && state.selection.is_confirm_enabled()
    }

    pub fn select_preset(
        &self,
        id: u32,
    ) -> Result<SelectionState, SessionError> {
        self.apply(SelectionAction::SelectPreset(id))
    }

    pub fn edit_free_text(
        &self,
        value: &str,
    ) -> Result<SelectionState, SessionError> {
        self.apply(SelectionAction::EditFreeText(value.to_string()))
    }

    pub fn select_payment_method(
        &self,
        method: &str,
    ) -> Result<(), SessionError> {
        let known = self
            .inner
            .config
            .payment_methods
            .iter()
            .find(|m| m.eq_ignore_ascii_case(method))
            .ok_or_else(|| SessionError::UnknownPaymentMethod(method.to_string()))?;

        let mut state = self.state();
        Self::require_composing(&state)?;
        debug!(method = %known, "payment method selected");
        state.payment_method = known.clone();
        self.publish(&state);
        Ok(())
    }

    /// Sends the active amount through the gateway.
    ///
    /// On failure the screen returns to composing with the amount intact and
    /// the error shown as a banner.
    pub async fn confirm(&self) -> Result<Receipt, SessionError> {
        let (minor_units, method, cancelled) = {
            let mut state = self.state();
            Self::require_composing(&state)?;
            if !state.selection.is_confirm_enabled() {
                return Err(SessionError::ConfirmDisabled);
            }
            let minor_units = match amount::to_minor_units(state.selection.active_amount()) {
                Ok(units) => units,
                Err(e) => {
                    state.input_error = Some(e.to_string());
                    self.publish(&state);
                    return Err(e.into());
                }
            };
            state.input_error = None;
            state.submission.begin()?;
            let (tx, rx) = oneshot::channel();
            state.in_flight = Some(tx);
            self.publish(&state);
            (minor_units, state.payment_method.clone(), rx)
        };

        info!(amount = minor_units, method = %method, "sending tip");
        let outcome = tokio::select! {
            result = self.send_with_retry(minor_units, &method) => Some(result),
            _ = cancelled => None,
        };

        let mut state = self.state();
        state.in_flight = None;
        let result = match outcome {
            Some(Ok(id)) => {
                let receipt = Receipt {
                    id,
                    amount_minor_units: minor_units,
                    method,
                    confirmed_at: Utc::now(),
                };
                info!(receipt = %receipt.id, "tip accepted");
                state.submission.succeed(receipt.clone())?;
                Ok(receipt)
            }
            Some(Err(e)) => {
                warn!(error = %e, "tip failed");
                state.submission.fail(e.clone())?;
                Err(SessionError::Payment(e))
            }
            None => {
                info!("tip cancelled while sending");
                state.submission.abort()?;
                Err(SessionError::Cancelled)
            }
        };
        self.publish(&state);
        result
    }

    /// Leaves the success screen. The amount stays as it was.
    pub fn back(&self) -> Result<(), SessionError> {
        let mut state = self.state();
        state.submission.back()?;
        self.publish(&state);
        Ok(())
    }

    /// Abandons any send in progress and asks the host to close the screen.
    pub fn cancel(&self) {
        self.abort_send();
        self.inner.host.dismiss();
    }

    /// Abandons the send in progress, if any, without closing the screen.
    /// The pending [`confirm`](Self::confirm) returns [`SessionError::Cancelled`].
    /// Returns whether there was a send to abandon.
    pub fn abort_send(&self) -> bool {
        let mut state = self.state();
        match state.in_flight.take() {
            Some(tx) => {
                debug!("cancelling in-flight tip");
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    /// Hides the error banner.
    pub fn dismiss_error(&self) {
        let mut state = self.state();
        state.input_error = None;
        state.submission.dismiss_error();
        self.publish(&state);
    }

    fn apply(
        &self,
        action: SelectionAction,
    ) -> Result<SelectionState, SessionError> {
        let mut state = self.state();
        Self::require_composing(&state)?;
        let next = self.inner.resolver.resolve(&state.selection, &action)?;
        state.selection = next.clone();
        state.input_error = None;
        self.publish(&state);
        Ok(next)
    }

    async fn send_with_retry(
        &self,
        minor_units: i64,
        method: &str,
    ) -> Result<ReceiptId, PaymentError> {
        let policy = &self.inner.config.retry;
        let max_attempts = policy.max_attempts.max(1);
        let mut backoff = policy.initial_backoff;
        let mut attempt = 1;

        loop {
            let call = self.inner.gateway.send_tip(minor_units, method);
            let result = match tokio::time::timeout(policy.request_timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(PaymentError::Timeout),
            };

            match result {
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    warn!(attempt, error = %e, ?backoff, "retrying tip");
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn require_composing(state: &SessionState) -> Result<(), SessionError> {
        if state.submission.is_composing() {
            Ok(())
        } else {
            Err(SessionError::NotComposing(state.submission.phase().name()))
        }
    }

    fn snapshot_of(
        &self,
        state: &SessionState,
    ) -> TipSnapshot {
        let error = state
            .input_error
            .clone()
            .or_else(|| state.submission.last_error().map(ToString::to_string));
        TipSnapshot {
            selection: state.selection.clone(),
            phase: state.submission.phase().clone(),
            confirm_enabled: state.submission.is_composing() && state.selection.is_confirm_enabled(),
            error,
            payment_method: state.payment_method.clone(),
            below_minimum: amount::is_below_minimum(
                state.selection.active_amount(),
                self.inner.config.minimum_amount,
            ),
        }
    }

    fn publish(
        &self,
        state: &SessionState,
    ) {
        // No subscribers is fine.
        let _ = self.inner.events.send(self.snapshot_of(state));
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
