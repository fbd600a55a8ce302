//! Text rendering of session snapshots.

mod success;
mod tipping;

use tip_core::{Suggestion, TipConfig, TipSnapshot};

pub use success::success_view;
pub use tipping::{pay_label, tipping_view};

/// Everything the views need besides the snapshot itself.
#[derive(Debug, Clone)]
pub struct ViewContext {
    pub suggestions: Vec<Suggestion>,
    pub currency_symbol: String,
    pub minimum_amount: String,
}

impl ViewContext {
    pub fn from_config(config: &TipConfig) -> Self {
        Self {
            suggestions: config.suggestions.clone(),
            currency_symbol: config.currency_symbol.clone(),
            minimum_amount: config.minimum_amount.to_string(),
        }
    }
}

/// Picks the screen for the snapshot's phase.
pub fn render(
    snapshot: &TipSnapshot,
    ctx: &ViewContext,
) -> String {
    match snapshot.phase.receipt() {
        Some(receipt) => success_view(receipt, ctx),
        None => tipping_view(snapshot, ctx),
    }
}
