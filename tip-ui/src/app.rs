//! Terminal driver: turns typed commands into session calls and re-renders
//! the screen whenever the session publishes a snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use tip_core::gateway::{GatewayConfig, GatewayRegistry};
use tip_core::{
    PaymentGateway, Receipt, ScreenHost, SessionError, SubmissionPhase, TipConfig, TipSession,
};
use tip_gateway_sim::SimulatedGatewayFactory;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::commands::{Command, HELP};
use crate::logging::{LogControl, log_task_error};
use crate::views::{self, ViewContext};

/// Register every gateway backend this binary ships with.
pub fn build_registry() -> GatewayRegistry {
    let mut registry = GatewayRegistry::new();
    registry.register(Box::new(SimulatedGatewayFactory));
    registry
}

/// Resolve `config` against the shipped backends.
pub async fn connect_gateway(config: &GatewayConfig) -> Result<Arc<dyn PaymentGateway>> {
    debug!("connecting to {} gateway", config.backend);
    Ok(build_registry().create(config).await?)
}

/// Host for a screen shown in the terminal: dismissing ends the loop.
#[derive(Debug, Default)]
pub struct TerminalHost {
    dismissed: AtomicBool,
}

impl TerminalHost {
    pub fn is_dismissed(&self) -> bool {
        self.dismissed.load(Ordering::SeqCst)
    }
}

impl ScreenHost for TerminalHost {
    fn dismiss(&self) {
        info!("tipping screen dismissed");
        self.dismissed.store(true, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct App {
    session: TipSession,
    host: Arc<TerminalHost>,
    view: ViewContext,
    log: Option<LogControl>,
    pending: Option<JoinHandle<Result<Receipt, SessionError>>>,
}

impl App {
    pub fn new(
        config: TipConfig,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let host = Arc::new(TerminalHost::default());
        let session = TipSession::new(config, gateway, host.clone());
        let view = ViewContext::from_config(session.config());
        Self {
            session,
            host,
            view,
            log: None,
            pending: None,
        }
    }

    pub fn with_log_control(
        mut self,
        log: LogControl,
    ) -> Self {
        self.log = Some(log);
        self
    }

    pub fn session(&self) -> &TipSession {
        &self.session
    }

    pub fn host(&self) -> &TerminalHost {
        &self.host
    }

    /// Current screen as text.
    pub fn render(&self) -> String {
        views::render(&self.session.snapshot(), &self.view)
    }

    /// Prints the screen after every published change until the session is
    /// dropped.
    pub fn spawn_renderer(&self) -> JoinHandle<()> {
        let mut rx = self.session.subscribe();
        let view = self.view.clone();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(snapshot) => println!("\n{}\n", views::render(&snapshot, &view)),
                    Err(RecvError::Lagged(skipped)) => debug!(skipped, "renderer lagged"),
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Applies one command. Messages meant for the user come back as `Ok`
    /// text; session refusals come back as errors.
    pub fn handle(
        &mut self,
        command: Command,
    ) -> Result<(Flow, Option<String>)> {
        match command {
            Command::Preset(id) => {
                self.session.select_preset(id)?;
            }
            Command::Amount(text) => {
                self.session.edit_free_text(&text)?;
            }
            Command::Method(name) => {
                self.session.select_payment_method(&name)?;
            }
            Command::Pay => {
                if self.is_sending() {
                    return Err(SessionError::NotComposing(SubmissionPhase::Sending.name()).into());
                }
                let snapshot = self.session.snapshot();
                if snapshot.phase != SubmissionPhase::Composing {
                    return Err(SessionError::NotComposing(snapshot.phase.name()).into());
                }
                if !snapshot.confirm_enabled {
                    return Err(SessionError::ConfirmDisabled.into());
                }
                let session = self.session.clone();
                self.pending = Some(tokio::spawn(async move { session.confirm().await }));
            }
            Command::Back => {
                self.session.back()?;
            }
            Command::Cancel => {
                self.abandon_pending();
                self.session.cancel();
            }
            Command::Dismiss => {
                self.session.dismiss_error();
            }
            Command::Log(level) => {
                let log = self
                    .log
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("logging not yet initialized"))?;
                log.set_log_level(&level)?;
                return Ok((Flow::Continue, Some(format!("log level set to '{level}'"))));
            }
            Command::Help => return Ok((Flow::Continue, Some(HELP.to_string()))),
            Command::Quit => {
                self.abandon_pending();
                return Ok((Flow::Exit, None));
            }
        }

        let flow = if self.host.is_dismissed() {
            Flow::Exit
        } else {
            Flow::Continue
        };
        Ok((flow, None))
    }

    /// Whether a send started by `pay` is still running.
    pub fn is_sending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.is_finished())
    }

    /// Stops a running send without closing the screen. A task that has not
    /// reached the gateway yet is aborted outright.
    fn abandon_pending(&mut self) {
        let Some(pending) = &self.pending else {
            return;
        };
        if pending.is_finished() {
            return;
        }
        if !self.session.abort_send() {
            debug!("aborting tip before it was sent");
            pending.abort();
        }
    }

    /// Waits for a send started by `pay`, if any, and returns its outcome.
    pub async fn settle(&mut self) -> Option<Result<Receipt, SessionError>> {
        let pending = self.pending.take()?;
        match pending.await {
            Ok(result) => Some(result),
            Err(e) if e.is_cancelled() => Some(Err(SessionError::Cancelled)),
            Err(e) => {
                log_task_error("send tip", Err(e));
                None
            }
        }
    }

    /// Reads command lines until `quit`, the sender closes, or the host is
    /// dismissed.
    pub async fn run(
        &mut self,
        mut input: mpsc::Receiver<String>,
    ) -> Result<()> {
        println!("{}\n", self.render());
        let renderer = self.spawn_renderer();

        while let Some(line) = input.recv().await {
            if line.trim().is_empty() {
                continue;
            }
            let outcome = line
                .parse::<Command>()
                .map_err(anyhow::Error::from)
                .and_then(|command| self.handle(command));
            match outcome {
                Ok((flow, message)) => {
                    if let Some(message) = message {
                        println!("{message}");
                    }
                    if flow == Flow::Exit {
                        break;
                    }
                }
                Err(e) => println!("! {e}"),
            }
        }

        if let Some(Err(e)) = self.settle().await {
            debug!(error = %e, "last tip did not go through");
        }
        renderer.abort();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use tip_core::{PaymentError, RetryPolicy};
    use tip_gateway_sim::SimulatedGateway;

    use super::*;

    fn app(script: &str) -> App {
        let gateway = Arc::new(SimulatedGateway::new(script.parse().unwrap()));
        App::new(TipConfig::default(), gateway)
    }

    fn run(
        app: &mut App,
        line: &str,
    ) -> Result<(Flow, Option<String>)> {
        app.handle(line.parse().unwrap())
    }

    #[test]
    fn registry_ships_simulated_backend() {
        assert_eq!(build_registry().available_backends(), vec!["simulated"]);
    }

    #[tokio::test]
    async fn connect_gateway_rejects_unknown_backend() {
        let config = GatewayConfig {
            backend: "acquirer".to_string(),
            connection_string: String::new(),
        };
        assert!(connect_gateway(&config).await.is_err());
    }

    #[tokio::test]
    async fn connect_gateway_reports_unreachable_backend() {
        let config = GatewayConfig {
            backend: "simulated".to_string(),
            connection_string: "unreachable".to_string(),
        };
        let err = connect_gateway(&config).await.err().unwrap();
        assert!(err.to_string().contains("unavailable"));
    }

    #[test]
    fn view_follows_session_config() {
        let config = TipConfig {
            currency_symbol: "$".to_string(),
            ..TipConfig::default()
        };
        let app = App::new(config, Arc::new(SimulatedGateway::default()));

        assert!(app.render().ends_with("Pay 0 $ (disabled)"));
    }

    #[tokio::test]
    async fn pay_runs_in_background_and_settles() {
        let mut app = app("approve");
        run(&mut app, "preset 2").unwrap();

        assert_eq!(run(&mut app, "pay").unwrap(), (Flow::Continue, None));
        let receipt = app.settle().await.unwrap().unwrap();

        assert_eq!(receipt.amount_minor_units, 700);
        assert!(app.render().starts_with("Thank you!"));
    }

    #[tokio::test]
    async fn second_pay_is_refused_while_first_is_running() {
        let gateway = Arc::new(SimulatedGateway::new("decline,approve".parse().unwrap()));
        let config = TipConfig {
            retry: RetryPolicy::no_retry(Duration::from_secs(5)),
            ..TipConfig::default()
        };
        let mut app = App::new(config, gateway.clone());
        run(&mut app, "preset 1").unwrap();
        run(&mut app, "pay").unwrap();

        let err = run(&mut app, "pay").unwrap_err();

        assert_eq!(err.to_string(), "Not editable while sending");
        assert!(matches!(
            app.settle().await,
            Some(Err(SessionError::Payment(PaymentError::Declined(_))))
        ));
        assert_eq!(gateway.calls(), 1);
        assert!(!app.session().snapshot().is_submitted());
    }

    #[tokio::test]
    async fn quit_abandons_a_slow_send() {
        let mut app = app("approve,latency=30000");
        let mut rx = app.session().subscribe();
        run(&mut app, "preset 0").unwrap();
        run(&mut app, "pay").unwrap();
        while rx.recv().await.unwrap().phase != SubmissionPhase::Sending {}

        assert_eq!(run(&mut app, "quit").unwrap(), (Flow::Exit, None));
        let outcome = tokio::time::timeout(Duration::from_secs(5), app.settle())
            .await
            .expect("quit should not wait for the gateway");

        assert_eq!(outcome, Some(Err(SessionError::Cancelled)));
        assert!(!app.host().is_dismissed());
        assert_eq!(app.session().snapshot().phase, SubmissionPhase::Composing);
    }

    #[tokio::test]
    async fn quit_before_the_send_starts_aborts_the_task() {
        let gateway = Arc::new(SimulatedGateway::new("approve".parse().unwrap()));
        let mut app = App::new(TipConfig::default(), gateway.clone());
        run(&mut app, "preset 0").unwrap();
        run(&mut app, "pay").unwrap();

        run(&mut app, "quit").unwrap();

        assert_eq!(app.settle().await, Some(Err(SessionError::Cancelled)));
        assert_eq!(gateway.calls(), 0);
    }

    #[test]
    fn pay_without_amount_is_refused_up_front() {
        let mut app = app("approve");

        let err = run(&mut app, "pay").unwrap_err();

        assert_eq!(err.to_string(), "Enter or select an amount first");
    }

    #[tokio::test]
    async fn cancel_right_after_pay_sends_nothing() {
        let gateway = Arc::new(SimulatedGateway::new("approve".parse().unwrap()));
        let mut app = App::new(TipConfig::default(), gateway.clone());
        run(&mut app, "preset 2").unwrap();
        run(&mut app, "pay").unwrap();

        assert_eq!(run(&mut app, "cancel").unwrap().0, Flow::Exit);

        assert_eq!(app.settle().await, Some(Err(SessionError::Cancelled)));
        assert_eq!(gateway.calls(), 0);
        assert!(app.host().is_dismissed());
    }

    #[test]
    fn cancel_dismisses_and_exits() {
        let mut app = app("approve");

        assert_eq!(run(&mut app, "cancel").unwrap().0, Flow::Exit);
        assert!(app.host().is_dismissed());
    }

    #[test]
    fn help_and_quit() {
        let mut app = app("approve");

        let (flow, message) = run(&mut app, "help").unwrap();
        assert_eq!(flow, Flow::Continue);
        assert!(message.unwrap().contains("preset <id>"));
        assert_eq!(run(&mut app, "quit").unwrap(), (Flow::Exit, None));
    }

    #[test]
    fn log_without_subscriber_is_an_error() {
        let mut app = app("approve");
        assert!(run(&mut app, "log debug").is_err());
    }

    fn scripted(lines: &[&str]) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(lines.len().max(1));
        for line in lines {
            tx.try_send(line.to_string()).unwrap();
        }
        rx
    }

    #[tokio::test]
    async fn run_processes_scripted_input() {
        let mut app = app("approve");

        app.run(scripted(&["amount 4", "method paypal", "pay"]))
            .await
            .unwrap();

        match app.session().snapshot().phase {
            SubmissionPhase::Submitted(receipt) => {
                assert_eq!(receipt.amount_minor_units, 400);
                assert_eq!(receipt.method, "PayPal");
            }
            other => panic!("expected submitted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn run_stops_after_cancel() {
        let mut app = app("approve");

        app.run(scripted(&["preset 0", "cancel", "preset 1"]))
            .await
            .unwrap();

        assert!(app.host().is_dismissed());
        assert_eq!(app.session().snapshot().selection.active_amount(), "3");
    }
}
