use serde::{Deserialize, Serialize};

/// A preset tip amount offered as a one-tap choice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: u32,
    pub amount: String,
}

impl Suggestion {
    /// Builds the preset list from plain amounts, numbering them from 0 in
    /// the order given.
    pub fn from_amounts<S: AsRef<str>>(amounts: &[S]) -> Vec<Suggestion> {
        amounts
            .iter()
            .zip(0u32..)
            .map(|(amount, id)| Suggestion {
                id,
                amount: amount.as_ref().to_string(),
            })
            .collect()
    }

    /// The presets shown when nothing else is configured: 3, 5 and 7.
    pub fn defaults() -> Vec<Suggestion> {
        Self::from_amounts(&["3", "5", "7"])
    }
}
