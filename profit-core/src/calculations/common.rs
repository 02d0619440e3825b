//! Common utility functions for profit calculations.
//!
//! This module provides shared functionality used by the metrics engine and
//! the aggregation pass, including rounding and guarded division.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to `dp` decimal places using half-up rounding.
///
/// Values at exactly the midpoint are rounded away from zero, which is what
/// drivers expect to see on a receipt.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use profit_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.455), 2), dec!(123.46));
/// assert_eq!(round_half_up(dec!(12.25), 1), dec!(12.3));
/// assert_eq!(round_half_up(dec!(-123.455), 2), dec!(-123.46));
/// ```
pub fn round_half_up(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Divides `numerator` by `denominator`, returning zero when the denominator
/// is zero and saturating when the quotient falls outside the decimal range.
pub fn ratio_or_zero(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or_else(|| {
        if numerator.is_sign_negative() == denominator.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        }
    })
}

/// `part / whole × 100`, or zero when `whole` is zero.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use profit_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(50), dec!(200)), dec!(25));
/// assert_eq!(percent_of(dec!(50), Decimal::ZERO), Decimal::ZERO);
/// ```
pub fn percent_of(
    part: Decimal,
    whole: Decimal,
) -> Decimal {
    ratio_or_zero(part, whole).saturating_mul(Decimal::ONE_HUNDRED)
}

/// Clamps a value into the closed range `[0, 1]`.
pub fn clamp_fraction(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE)
}
