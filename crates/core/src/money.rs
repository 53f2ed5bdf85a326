//! Amounts
//!
//! Monetary values are whole New Taiwan dollars. The storefront never deals
//! in fractional subunits, so every amount is a non-negative integer and
//! every derivation step rounds before its result is combined further.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso};
use thiserror::Error;

/// A monetary amount in whole dollars.
pub type Amount = u64;

/// Errors that can occur during percentage-of-amount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    /// The decimal product overflowed or could not be represented as an
    /// [`Amount`].
    #[error("percentage calculation overflowed or was not representable")]
    PercentOverflow,
}

/// Calculates `percent` of `amount`, rounded half away from zero.
///
/// This is the single rounding convention used for every discount
/// derivation; callers always combine already-integral amounts.
///
/// # Errors
///
/// Returns [`AmountError::PercentOverflow`] if the product cannot be
/// represented as an [`Amount`].
pub fn percent_of(percent: Percentage, amount: Amount) -> Result<Amount, AmountError> {
    let applied = Decimal::from(amount)
        .checked_mul(percent * Decimal::ONE)
        .ok_or(AmountError::PercentOverflow)?;

    let rounded = applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    rounded.to_u64().ok_or(AmountError::PercentOverflow)
}

/// Formats an amount for display in the storefront currency.
///
/// Amounts beyond the formatter's range fall back to a plain rendering.
pub fn format_amount(amount: Amount) -> String {
    i64::try_from(amount).map_or_else(
        |_| format!("NT${amount}"),
        |major| Money::from_major(major, iso::TWD).to_string(),
    )
}
