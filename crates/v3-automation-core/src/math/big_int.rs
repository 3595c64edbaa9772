//! Big integer operations for exact Q96 math
//!
//! Thin helpers over `num_bigint` that mirror the fixed-width integer
//! primitives used on chain: mul_div with explicit rounding, power-of-ten
//! scaling and conversions to and from decimal strings.

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};

use crate::errors::{AutomationError, CoreResult};

/// Rounding mode for integer division operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round down (towards zero)
    Down,
    /// Round up (away from zero)
    Up,
}

/// Multiply two values and divide by a third with specified rounding
/// result = (a * b) / denominator
pub fn mul_div(
    a: &BigUint,
    b: &BigUint,
    denominator: &BigUint,
    rounding: Rounding,
) -> CoreResult<BigUint> {
    if denominator.is_zero() {
        return Err(AutomationError::DivisionByZero);
    }

    let product = a * b;
    let (quotient, remainder) = product.div_rem(denominator);

    if rounding == Rounding::Up && !remainder.is_zero() {
        return Ok(quotient + 1u8);
    }

    Ok(quotient)
}

/// Divide with specified rounding
pub fn div_rounding(
    numerator: &BigUint,
    denominator: &BigUint,
    rounding: Rounding,
) -> CoreResult<BigUint> {
    if denominator.is_zero() {
        return Err(AutomationError::DivisionByZero);
    }

    let (quotient, remainder) = numerator.div_rem(denominator);
    if rounding == Rounding::Up && !remainder.is_zero() {
        Ok(quotient + 1u8)
    } else {
        Ok(quotient)
    }
}

/// 10^exponent as a signed big integer
pub fn pow10(exponent: u64) -> BigInt {
    num_traits::pow::pow(BigInt::from(10u8), exponent as usize)
}

/// Number of decimal digits in the magnitude of `value` (zero has one digit)
pub fn count_digits(value: &BigInt) -> u64 {
    value.magnitude().to_str_radix(10).len() as u64
}

/// Narrow to u128, failing when the value does not fit (uint128 liquidity)
pub fn to_u128(value: &BigUint) -> CoreResult<u128> {
    value.to_u128().ok_or(AutomationError::LiquidityOverflow)
}

/// Reinterpret an unsigned value as signed
pub fn to_signed(value: &BigUint) -> BigInt {
    BigInt::from_biguint(Sign::Plus, value.clone())
}

/// Convert a non-negative signed value to unsigned, clamping negatives to zero
pub fn to_unsigned_saturating(value: &BigInt) -> BigUint {
    value.to_biguint().unwrap_or_default()
}

/// Serde helper that encodes [`BigUint`] as a base-10 string
pub mod biguint_string {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_str_radix(10))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid integer string: {}", s)))
    }
}
