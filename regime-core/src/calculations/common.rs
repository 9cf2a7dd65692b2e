//! Common utility functions for regime calculations.
//!
//! Calculations keep full precision. Rounding to two places happens only
//! when a value is serialised or formatted for display.

use rust_decimal::Decimal;
use serde::Serializer;

use crate::RegimeError;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Largest amount accepted from callers: 10^15. Products and annualised sums
/// of such amounts stay well inside the `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Smallest revenue accepted from callers: one cent.
pub const MIN_REVENUE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Checks a caller-supplied amount lies in `[0, MAX_AMOUNT]`.
pub fn check_amount(
    field: &str,
    value: Decimal,
) -> Result<Decimal, RegimeError> {
    if value < Decimal::ZERO {
        return Err(RegimeError::invalid(format!(
            "{field} must not be negative, got {value}"
        )));
    }
    if value > MAX_AMOUNT {
        return Err(RegimeError::invalid(format!(
            "{field} must not exceed {MAX_AMOUNT}, got {value}"
        )));
    }
    Ok(value)
}

/// Checks a revenue used as a divisor lies in `[MIN_REVENUE, MAX_AMOUNT]`.
pub fn check_revenue(
    field: &str,
    value: Decimal,
) -> Result<Decimal, RegimeError> {
    if value <= Decimal::ZERO {
        return Err(RegimeError::invalid(format!(
            "{field} must be positive, got {value}"
        )));
    }
    if value < MIN_REVENUE {
        return Err(RegimeError::invalid(format!(
            "{field} must be at least {MIN_REVENUE}, got {value}"
        )));
    }
    check_amount(field, value)
}

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use regime_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// `pct` percent of `amount`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use regime_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(300000), dec!(8)), dec!(24000));
/// ```
pub fn percent_of(
    amount: Decimal,
    pct: Decimal,
) -> Decimal {
    amount * pct / HUNDRED
}

/// `part` as a percentage of `whole`, or zero when `whole` is not positive.
pub fn ratio_pct(
    part: Decimal,
    whole: Decimal,
) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part / whole * HUNDRED
}

/// Clamps a rate into `[0, 100)`.
pub fn clamp_rate_pct(rate: Decimal) -> Decimal {
    if rate < Decimal::ZERO {
        Decimal::ZERO
    } else if rate >= HUNDRED {
        Decimal::new(9999, 2)
    } else {
        rate
    }
}

/// Rounds to two places and pins the scale so `8000` prints as `8000.00`.
pub fn to_money(value: Decimal) -> Decimal {
    let mut rounded = round_half_up(value);
    rounded.rescale(2);
    rounded
}

/// Formats a percentage for display, e.g. `4.3300` becomes `"4.33%"`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use regime_core::calculations::common::format_pct;
///
/// assert_eq!(format_pct(dec!(16.666666)), "16.67%");
/// assert_eq!(format_pct(dec!(28)), "28.00%");
/// ```
pub fn format_pct(rate: Decimal) -> String {
    format!("{}%", to_money(rate))
}

/// Serde helper: serialises a monetary value rounded to two places.
pub fn serialize_money<S>(
    value: &Decimal,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serde::Serialize::serialize(&to_money(*value), serializer)
}

/// Serde helper for optional monetary values.
pub fn serialize_opt_money<S>(
    value: &Option<Decimal>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(v) => serialize_money(v, serializer),
        None => serializer.serialize_none(),
    }
}
