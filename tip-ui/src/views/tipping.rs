use tip_core::{SubmissionPhase, TipSnapshot};

use super::ViewContext;

/// Text of the pay button: the active amount, or 0 when nothing is chosen.
pub fn pay_label(
    snapshot: &TipSnapshot,
    currency_symbol: &str,
) -> String {
    let amount = snapshot.selection.active_amount();
    let amount = if amount.is_empty() { "0" } else { amount };
    format!("Pay {amount} {currency_symbol}")
}

/// The composing screen: presets, custom field, method, actions.
pub fn tipping_view(
    snapshot: &TipSnapshot,
    ctx: &ViewContext,
) -> String {
    let symbol = &ctx.currency_symbol;
    let selected = snapshot.selection.selected_preset();
    let buttons: Vec<String> = ctx
        .suggestions
        .iter()
        .map(|s| {
            if selected == Some(s.id) {
                format!("[{}] *{} {symbol}*", s.id, s.amount)
            } else {
                format!("[{}] {} {symbol}", s.id, s.amount)
            }
        })
        .collect();

    let typed = snapshot.selection.free_text_value();
    let field = if typed.is_empty() {
        format!("0.00 {symbol}")
    } else {
        typed.to_string()
    };

    let mut lines = vec![
        "Tip the driver".to_string(),
        String::new(),
        format!("  {}", buttons.join("   ")),
        String::new(),
        format!("Or enter a custom amount: {field}"),
        format!("  minimum amount {} {symbol}", ctx.minimum_amount),
    ];
    if snapshot.below_minimum {
        lines.push("  (below the minimum amount)".to_string());
    }
    lines.push(format!("Payment method: {}", snapshot.payment_method));
    if let Some(error) = &snapshot.error {
        lines.push(format!("! {error}"));
    }
    lines.push(String::new());

    let pay = pay_label(snapshot, symbol);
    let action = match snapshot.phase {
        SubmissionPhase::Sending => format!("{pay} (sending...)"),
        _ if snapshot.confirm_enabled => pay,
        _ => format!("{pay} (disabled)"),
    };
    lines.push(format!("Cancel    {action}"));
    lines.join("\n")
}
