use thiserror::Error;
use tracing::debug;

use crate::models::Suggestion;

use super::state::SelectionState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no preset with id {0}")]
    UnknownPreset(u32),
}

/// A user interaction that can change the selected amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionAction {
    /// A preset button was tapped.
    SelectPreset(u32),
    /// The custom amount field now holds this text.
    EditFreeText(String),
}

/// Computes selection changes against a fixed list of presets.
///
/// The resolver holds no selection of its own: every operation takes the
/// current [`SelectionState`] and returns the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipAmountResolver {
    suggestions: Vec<Suggestion>,
}

impl TipAmountResolver {
    pub fn new(suggestions: Vec<Suggestion>) -> Self {
        Self { suggestions }
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn suggestion(
        &self,
        id: u32,
    ) -> Option<&Suggestion> {
        self.suggestions.iter().find(|s| s.id == id)
    }

    /// Applies one action to `current`.
    pub fn resolve(
        &self,
        current: &SelectionState,
        action: &SelectionAction,
    ) -> Result<SelectionState, SelectionError> {
        let next = match action {
            SelectionAction::SelectPreset(id) => self.select_preset(*id)?,
            SelectionAction::EditFreeText(value) => Self::edit_free_text(value),
        };
        debug!(
            from = ?current.source(),
            to = ?next.source(),
            amount = next.active_amount(),
            "selection changed"
        );
        Ok(next)
    }

    /// Selection after tapping preset `id`. Replaces whatever was chosen
    /// before, typed text included.
    pub fn select_preset(
        &self,
        id: u32,
    ) -> Result<SelectionState, SelectionError> {
        let suggestion = self
            .suggestion(id)
            .ok_or(SelectionError::UnknownPreset(id))?;
        Ok(SelectionState::preset(suggestion.id, &suggestion.amount))
    }

    /// Selection after the custom field changed to `value`.
    ///
    /// Any non-empty text wins over a preset. No numeric check happens here.
    pub fn edit_free_text(value: &str) -> SelectionState {
        SelectionState::free_text(value)
    }

    pub fn is_confirm_enabled(state: &SelectionState) -> bool {
        state.is_confirm_enabled()
    }
}

impl Default for TipAmountResolver {
    fn default() -> Self {
        Self::new(Suggestion::defaults())
    }
}
