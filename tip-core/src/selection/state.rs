use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the active tip amount came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionSource {
    #[default]
    None,
    Preset(u32),
    FreeText,
}

/// The tip amount currently chosen on the screen.
///
/// The amount is empty exactly when the source is [`SelectionSource::None`].
/// Fields are private so that only the constructors below can build a value,
/// and they all keep that pairing intact. Deserialization goes through the
/// same check.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "SelectionParts")]
pub struct SelectionState {
    active_amount: String,
    source: SelectionSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("selection amount '{amount}' does not match {origin:?}")]
pub struct InvalidSelection {
    amount: String,
    origin: SelectionSource,
}

#[derive(Deserialize)]
struct SelectionParts {
    active_amount: String,
    source: SelectionSource,
}

impl TryFrom<SelectionParts> for SelectionState {
    type Error = InvalidSelection;

    fn try_from(parts: SelectionParts) -> Result<Self, Self::Error> {
        let SelectionParts {
            active_amount,
            source,
        } = parts;
        if active_amount.is_empty() != (source == SelectionSource::None) {
            return Err(InvalidSelection {
                amount: active_amount,
                origin: source,
            });
        }
        Ok(Self {
            active_amount,
            source,
        })
    }
}

impl SelectionState {
    /// Nothing selected, nothing typed.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn preset(
        id: u32,
        amount: &str,
    ) -> Self {
        if amount.is_empty() {
            return Self::empty();
        }
        Self {
            active_amount: amount.to_string(),
            source: SelectionSource::Preset(id),
        }
    }

    /// A typed amount. Empty text yields the empty selection.
    pub(crate) fn free_text(value: &str) -> Self {
        if value.is_empty() {
            return Self::empty();
        }
        Self {
            active_amount: value.to_string(),
            source: SelectionSource::FreeText,
        }
    }

    pub fn active_amount(&self) -> &str {
        &self.active_amount
    }

    pub fn source(&self) -> SelectionSource {
        self.source
    }

    /// Confirm is only offered once there is something to pay.
    pub fn is_confirm_enabled(&self) -> bool {
        !self.active_amount.is_empty()
    }

    /// Id of the highlighted preset, if the amount came from one.
    pub fn selected_preset(&self) -> Option<u32> {
        match self.source {
            SelectionSource::Preset(id) => Some(id),
            _ => None,
        }
    }

    /// Content of the custom amount field. Choosing a preset clears it.
    pub fn free_text_value(&self) -> &str {
        match self.source {
            SelectionSource::FreeText => &self.active_amount,
            _ => "",
        }
    }
}
