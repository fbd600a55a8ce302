//! Tip amount selection: one active amount, from a preset or typed text.

mod resolver;
mod state;

pub use resolver::{SelectionAction, SelectionError, TipAmountResolver};
pub use state::{InvalidSelection, SelectionSource, SelectionState};
