//! Money calculation utilities using rust_decimal for precision
//!
//! Booking amounts are currency-agnostic magnitudes kept at two decimal
//! places. Gateways take integer minor units of their configured currency.

use rust_decimal::prelude::*;

use crate::error::{EngineError, EngineResult};

/// Rounding precision for booking amounts (2 decimal places, half-up)
pub const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price or surcharge
pub const MAX_PRICE: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// Largest minor-unit exponent of any ISO 4217 currency
pub const MAX_MINOR_UNIT_EXPONENT: u32 = 4;

/// Round to the smallest booking currency unit, half away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `total × percent / 100`, rounded half-up
pub fn percent_of(total: Decimal, percent: u32) -> Decimal {
    round_money(total * Decimal::from(percent) / Decimal::ONE_HUNDRED)
}

/// Convert an amount to integer minor units (`exponent` = currency decimals)
pub fn to_minor_units(amount: Decimal, exponent: u32) -> EngineResult<i64> {
    check_exponent(exponent)?;
    let scaled = amount
        .checked_mul(Decimal::from(10i64.pow(exponent)))
        .ok_or_else(|| EngineError::validation(format!("amount {amount} out of range")))?;
    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| EngineError::validation(format!("amount {amount} out of range")))
}

/// Convert integer minor units back to an amount
pub fn from_minor_units(minor: i64, exponent: u32) -> EngineResult<Decimal> {
    check_exponent(exponent)?;
    Ok(Decimal::new(minor, exponent))
}

/// Whether two amounts charge the same number of minor units
pub fn same_minor_amount(a: Decimal, b: Decimal, exponent: u32) -> EngineResult<bool> {
    Ok(to_minor_units(a, exponent)? == to_minor_units(b, exponent)?)
}

fn check_exponent(exponent: u32) -> EngineResult<()> {
    if exponent > MAX_MINOR_UNIT_EXPONENT {
        return Err(EngineError::validation(format!(
            "minor unit exponent {exponent} exceeds {MAX_MINOR_UNIT_EXPONENT}"
        )));
    }
    Ok(())
}

/// Validate a price-like amount: non-negative (or strictly positive) and bounded
pub fn validate_amount(value: Decimal, field_name: &str, allow_zero: bool) -> EngineResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(EngineError::validation(format!(
            "{field_name} must be non-negative, got {value}"
        )));
    }
    if !allow_zero && value.is_zero() {
        return Err(EngineError::validation(format!(
            "{field_name} must be positive"
        )));
    }
    if value > MAX_PRICE {
        return Err(EngineError::validation(format!(
            "{field_name} exceeds maximum allowed ({MAX_PRICE}), got {value}"
        )));
    }
    Ok(())
}
