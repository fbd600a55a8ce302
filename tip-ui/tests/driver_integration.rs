//! Drives the terminal app against the simulated gateway built from settings.

use pretty_assertions::assert_eq;
use tip_core::{PaymentError, SessionError, SubmissionPhase};
use tip_ui::app::{self, App, Flow};
use tip_ui::config::Settings;

async fn app_from(settings_toml: &str) -> App {
    let settings = Settings::parse(settings_toml).expect("valid settings");
    let gateway = app::connect_gateway(&settings.gateway_config())
        .await
        .expect("gateway");
    App::new(settings.tip_config(), gateway)
}

fn handle(
    app: &mut App,
    line: &str,
) -> (Flow, Option<String>) {
    app.handle(line.parse().expect("command")).expect("accepted")
}

#[tokio::test]
async fn retried_outage_still_pays() {
    let mut app = app_from(
        r#"
        [gateway]
        connection_string = "offline,timeout,approve"

        [retry]
        max_attempts = 3
        initial_backoff_ms = 1
        "#,
    )
    .await;

    handle(&mut app, "preset 1");
    handle(&mut app, "pay");
    let receipt = app.settle().await.unwrap().unwrap();

    assert_eq!(receipt.amount_minor_units, 500);
    assert_eq!(receipt.id.as_str(), "sim-000001");
    assert!(app.render().contains("Your tip of 5.00 € was sent with Apple Pay."));
}

#[tokio::test]
async fn decline_keeps_amount_and_shows_banner() {
    let mut app = app_from(
        r#"
        [gateway]
        connection_string = "decline,approve"
        "#,
    )
    .await;

    handle(&mut app, "amount 12");
    handle(&mut app, "pay");
    let outcome = app.settle().await.unwrap();

    assert!(matches!(
        outcome,
        Err(SessionError::Payment(PaymentError::Declined(_)))
    ));
    let screen = app.render();
    assert!(screen.contains("Or enter a custom amount: 12"));
    assert!(screen.contains("! Payment declined"));
    assert!(screen.ends_with("Pay 12 €"));

    handle(&mut app, "pay");
    assert!(app.settle().await.unwrap().is_ok());
    assert!(app.session().snapshot().is_submitted());
}

#[tokio::test]
async fn cancel_during_slow_send_exits_without_paying() {
    let mut app = app_from(
        r#"
        [gateway]
        connection_string = "approve,latency=30000"
        "#,
    )
    .await;
    let mut rx = app.session().subscribe();

    handle(&mut app, "preset 0");
    handle(&mut app, "pay");
    while rx.recv().await.unwrap().phase != SubmissionPhase::Sending {}

    let (flow, _) = handle(&mut app, "cancel");

    assert_eq!(flow, Flow::Exit);
    assert_eq!(app.settle().await, Some(Err(SessionError::Cancelled)));
    assert_eq!(app.session().snapshot().phase, SubmissionPhase::Composing);
}

#[tokio::test]
async fn back_from_success_keeps_amount() {
    let mut app = app_from("").await;

    handle(&mut app, "amount 10");
    handle(&mut app, "pay");
    app.settle().await.unwrap().unwrap();
    handle(&mut app, "back");

    let snapshot = app.session().snapshot();
    assert!(!snapshot.is_submitted());
    assert_eq!(snapshot.selection.active_amount(), "10");
}

#[tokio::test]
async fn configured_presets_and_initial_selection() {
    let app = app_from(
        r#"
        presets = ["1", "2"]
        initial_preset = 1
        currency_symbol = "$"
        "#,
    )
    .await;

    let screen = app.render();
    assert!(screen.contains("[0] 1 $   [1] *2 $*"));
    assert!(screen.ends_with("Pay 2 $"));
}
