//! Fixed-point conversion between 18-decimal base units and `Decimal`.
//!
//! Conversions are exact. Rounding happens only in [`format_amount`], which is
//! meant for presentation and must never feed an on-chain amount.

use std::str::FromStr;

use alloy_primitives::U256;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::BASE_UNIT_DECIMALS;
use crate::errors::{Error, Result};

/// Digits a `Decimal` holds without rounding.
const MAX_SIGNIFICANT_DIGITS: usize = 28;

/// Converts a base-unit integer to a display amount.
///
/// Fails with `InvalidAmount` when the value does not fit a `Decimal` at
/// 18 fractional digits (roughly 79 billion display units).
pub fn to_display(base_units: U256) -> Result<Decimal> {
    let raw = u128::try_from(base_units)
        .ok()
        .and_then(|v| i128::try_from(v).ok())
        .ok_or_else(|| Error::InvalidAmount(format!("{} base units out of range", base_units)))?;
    Decimal::try_from_i128_with_scale(raw, BASE_UNIT_DECIMALS)
        .map(|d| d.normalize())
        .map_err(|_| Error::InvalidAmount(format!("{} base units out of range", base_units)))
}

/// Converts a positive display amount to base units.
///
/// ```
/// use alloy_primitives::U256;
/// use rust_decimal_macros::dec;
/// use yieldfolio_core::units::to_base_units;
///
/// assert_eq!(
///     to_base_units(dec!(1.5)).unwrap(),
///     U256::from(1_500_000_000_000_000_000u128)
/// );
/// ```
pub fn to_base_units(display: Decimal) -> Result<U256> {
    if display <= Decimal::ZERO {
        return Err(Error::InvalidAmount(format!(
            "{} is not a positive amount",
            display
        )));
    }
    let normalized = display.normalize();
    let scale = normalized.scale();
    if scale > BASE_UNIT_DECIMALS {
        return Err(Error::InvalidAmount(format!(
            "{} has more than {} fractional digits",
            display, BASE_UNIT_DECIMALS
        )));
    }
    let mantissa = u128::try_from(normalized.mantissa())
        .map_err(|_| Error::InvalidAmount(format!("{} is not a positive amount", display)))?;
    let factor = U256::from(10u8).pow(U256::from(BASE_UNIT_DECIMALS - scale));
    Ok(U256::from(mantissa) * factor)
}

/// Parses user input into a positive display amount.
///
/// Accepts plain decimal notation only (`"0.5"`, `"12"`, `".25"`), rejecting
/// exponents, signs other than a leading `+`, and more than 18 fractional
/// digits.
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidAmount("amount is empty".to_string()));
    }

    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((w, f)) => (w, f),
        None => (unsigned, ""),
    };
    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !digits_only(whole) || !digits_only(fraction) {
        return Err(Error::InvalidAmount(format!("'{}' is not a number", trimmed)));
    }
    if fraction.len() > BASE_UNIT_DECIMALS as usize {
        return Err(Error::InvalidAmount(format!(
            "'{}' has more than {} fractional digits",
            trimmed, BASE_UNIT_DECIMALS
        )));
    }

    let significant_whole = whole.trim_start_matches('0').len();
    if significant_whole + fraction.len() > MAX_SIGNIFICANT_DIGITS {
        return Err(Error::InvalidAmount(format!(
            "'{}' has too many digits",
            trimmed
        )));
    }

    let normalized_input = format!(
        "{}.{}",
        if whole.is_empty() { "0" } else { whole },
        if fraction.is_empty() { "0" } else { fraction }
    );
    let amount = Decimal::from_str(&normalized_input)
        .map_err(|_| Error::InvalidAmount(format!("'{}' is out of range", trimmed)))?;
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount(format!(
            "'{}' is not a positive amount",
            trimmed
        )));
    }
    Ok(amount)
}

/// Rounds for display, keeping exactly `dp` fractional digits.
pub fn format_amount(amount: Decimal, dp: u32) -> String {
    let mut rounded = amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded.to_string()
}
