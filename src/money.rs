//! Money

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors raised while converting configured decimal amounts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    /// The amount was below zero.
    #[error("amount {0} is negative")]
    Negative(Decimal),

    /// The amount does not fit into minor units.
    #[error("amount {0} is too large")]
    Overflow(Decimal),

    /// The ISO currency code is not known.
    #[error("unknown currency code {0}")]
    UnknownCurrency(String),
}

/// Look up an ISO 4217 currency by its alphabetic code.
///
/// # Errors
///
/// Returns [`AmountError::UnknownCurrency`] when the code is not recognised.
pub fn currency(code: &str) -> Result<&'static Currency, AmountError> {
    rusty_money::iso::find(&code.to_ascii_uppercase())
        .ok_or_else(|| AmountError::UnknownCurrency(code.to_string()))
}

/// Convert a major-unit decimal amount (`5.25`) into minor units (`525`).
///
/// Fractions of a minor unit are rounded half away from zero.
///
/// # Errors
///
/// Returns an error for negative amounts or amounts that overflow `u64`.
pub fn to_minor_units(amount: Decimal, currency: &Currency) -> Result<u64, AmountError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AmountError::Negative(amount));
    }

    let scale = Decimal::from(10_u64.pow(currency.exponent));

    amount
        .checked_mul(scale)
        .map(|scaled| scaled.round())
        .and_then(|scaled| scaled.to_u64())
        .ok_or(AmountError::Overflow(amount))
}

/// Render minor units in the given currency, e.g. `1650` as `$16.50`.
pub fn format_minor(amount: u64, currency: &'static Currency) -> String {
    let minor = i64::try_from(amount).unwrap_or(i64::MAX);

    Money::from_minor(minor, currency).to_string()
}
