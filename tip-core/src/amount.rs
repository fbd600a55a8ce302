//! Conversion of typed tip amounts into gateway minor units.
//!
//! Amounts travel through the selection logic as the text the user typed or
//! the preset label. They only become numbers when a tip is sent, at which
//! point they are rounded to cents and expressed as an integer count of
//! minor units.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("no amount entered")]
    Empty,

    #[error("invalid amount '{input}'")]
    Invalid { input: String },

    #[error("amount must be greater than zero")]
    NotPositive,
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_amount_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded up to 0.01 (away from zero).
///
/// ```
/// use rust_decimal_macros::dec;
/// use tip_core::amount::round_half_up;
///
/// assert_eq!(round_half_up(dec!(2.454)), dec!(2.45));
/// assert_eq!(round_half_up(dec!(2.455)), dec!(2.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Parses a tip amount into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,000"`). Unlike form fields
/// elsewhere, empty input is an error here: there is nothing to send.
pub fn parse_amount(s: &str) -> Result<Decimal, AmountError> {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Err(AmountError::Empty);
    }
    normalized.parse().map_err(|e| {
        tracing::warn!(input = %s, "invalid tip amount: {}", e);
        AmountError::Invalid {
            input: s.to_string(),
        }
    })
}

/// Converts a typed amount into minor units (cents), rounding half-up.
///
/// ```
/// use tip_core::amount::to_minor_units;
///
/// assert_eq!(to_minor_units("2.50"), Ok(250));
/// assert_eq!(to_minor_units("5"), Ok(500));
/// ```
pub fn to_minor_units(s: &str) -> Result<i64, AmountError> {
    let rounded = round_half_up(parse_amount(s)?);
    if rounded <= Decimal::ZERO {
        return Err(AmountError::NotPositive);
    }
    rounded
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| AmountError::Invalid {
            input: s.to_string(),
        })
}

/// Whether `s` parses to an amount strictly below `minimum`.
///
/// Unparseable input is not reported as below the minimum; it fails later
/// when the tip is sent.
pub fn is_below_minimum(
    s: &str,
    minimum: Decimal,
) -> bool {
    match parse_amount(s) {
        Ok(value) => value < minimum,
        Err(_) => false,
    }
}

/// Formats minor units back into a two-decimal amount, e.g. `250` -> `"2.50"`.
pub fn format_minor_units(minor_units: i64) -> String {
    Decimal::new(minor_units, 2).to_string()
}
