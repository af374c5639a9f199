//! Bounds for amounts that end up in `NUMERIC(12, 2)` columns.

use bigdecimal::{BigDecimal, RoundingMode, Signed, Zero};

/// Whole-unit digits a stored amount may have.
pub const MAX_INTEGER_DIGITS: i64 = 10;

/// Significant digits accepted from outside before rounding is attempted.
const MAX_INPUT_DIGITS: i64 = 40;

/// Upper estimate of the number of digits left of the decimal point.
/// May be one higher than the exact count.
fn integer_digits_estimate(amount: &BigDecimal) -> (i64, i64) {
    let (int, scale) = amount.as_bigint_and_exponent();
    let digits = (int.bits() as f64 * std::f64::consts::LOG10_2).floor() as i64 + 1;
    (digits.saturating_sub(scale), digits)
}

pub fn fits_column(amount: &BigDecimal) -> bool {
    let limit = BigDecimal::from(10_i64.pow(MAX_INTEGER_DIGITS as u32));
    amount.abs() < limit
}

/// Rounds half-up to kopecks. `None` when the value cannot be stored.
///
/// The magnitude is checked on the raw representation first, so an input such
/// as `1e-1000000` costs no more than `0.01`.
pub fn normalize_amount(amount: &BigDecimal) -> Option<BigDecimal> {
    if amount.is_zero() {
        return Some(BigDecimal::zero());
    }
    let (integer_digits, digits) = integer_digits_estimate(amount);
    if integer_digits <= -3 {
        return Some(BigDecimal::zero());
    }
    if integer_digits > MAX_INTEGER_DIGITS + 1 || digits > MAX_INPUT_DIGITS {
        return None;
    }
    let rounded = amount.with_scale_round(2, RoundingMode::HalfUp);
    fits_column(&rounded).then_some(rounded)
}
