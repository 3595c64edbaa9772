//! # Decimal Context
//!
//! Fixed-precision decimal arithmetic over [`BigDecimal`]. Addition,
//! subtraction and multiplication of `BigDecimal` values are exact; the
//! operations that are not (division, square root, rounding) go through a
//! [`DecimalContext`] which carries the working precision explicitly.
//!
//! There is no global precision setting. Where a conversion needs more
//! digits than the caller's context provides, it derives an elevated copy
//! with [`DecimalContext::with_min_precision`] and the caller's context is
//! left untouched on every exit path.

use std::num::NonZeroU64;

use bigdecimal::{BigDecimal, Context};
use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{Signed, Zero};

use crate::constants::{DEFAULT_DECIMAL_PRECISION, MIN_DECIMAL_PRECISION};
use crate::errors::{AutomationError, CoreResult};
use crate::math::big_int::{count_digits, pow10, to_signed};

pub use bigdecimal::RoundingMode;

/// Working precision for decimal math
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalContext {
    precision: NonZeroU64,
    rounding: RoundingMode,
}

impl Default for DecimalContext {
    fn default() -> Self {
        Self {
            precision: NonZeroU64::new(DEFAULT_DECIMAL_PRECISION).unwrap_or(NonZeroU64::MIN),
            rounding: RoundingMode::HalfUp,
        }
    }
}

impl DecimalContext {
    /// Create a context with `precision` significant digits
    pub fn new(precision: u64, rounding: RoundingMode) -> CoreResult<Self> {
        if precision < MIN_DECIMAL_PRECISION {
            return Err(AutomationError::config(format!(
                "decimal precision {} is below the minimum of {}",
                precision, MIN_DECIMAL_PRECISION
            )));
        }
        let precision = NonZeroU64::new(precision)
            .ok_or_else(|| AutomationError::config("decimal precision must be non-zero"))?;
        Ok(Self { precision, rounding })
    }

    /// Number of significant digits kept by inexact operations
    pub fn precision(&self) -> u64 {
        self.precision.get()
    }

    /// Rounding mode applied by inexact operations
    pub fn rounding(&self) -> RoundingMode {
        self.rounding
    }

    /// The equivalent `bigdecimal` context
    pub fn as_context(&self) -> Context {
        Context::new(self.precision, self.rounding)
    }

    /// A copy of this context carrying at least `digits` significant digits
    pub fn with_min_precision(&self, digits: u64) -> Self {
        match NonZeroU64::new(digits) {
            Some(digits) if digits > self.precision => Self {
                precision: digits,
                rounding: self.rounding,
            },
            _ => *self,
        }
    }

    // ========================================================================
    // Inexact Operations
    // ========================================================================

    /// `a / b` to the working precision
    pub fn div(&self, a: &BigDecimal, b: &BigDecimal) -> CoreResult<BigDecimal> {
        if b.is_zero() {
            return Err(AutomationError::DivisionByZero);
        }
        if a.is_zero() {
            return Ok(BigDecimal::zero());
        }

        let (ma, sa) = a.as_bigint_and_exponent();
        let (mb, sb) = b.as_bigint_and_exponent();

        // Enough guard digits that the quotient carries precision + 2 digits
        let shift = (self.precision() as i64 + 2 + count_digits(&mb) as i64
            - count_digits(&ma) as i64)
            .max(0);
        let numerator = ma * pow10(shift as u64);
        let (mut quotient, remainder) = numerator.div_rem(&mb);
        let mut scale = sa - sb + shift;

        // A trailing non-zero digit keeps an inexact tail visible to rounding
        if !remainder.is_zero() {
            let sticky = if quotient.sign() == Sign::Minus { -1 } else { 1 };
            quotient = quotient * 10 + sticky;
            scale += 1;
        }
        Ok(self.round(&BigDecimal::new(quotient, scale)))
    }

    /// Square root to the working precision
    pub fn sqrt(&self, value: &BigDecimal) -> CoreResult<BigDecimal> {
        if value.is_negative() {
            return Err(AutomationError::NegativeSqrt);
        }
        value
            .sqrt_with_context(&self.as_context())
            .ok_or(AutomationError::NegativeSqrt)
    }

    /// Round `value` to the working number of significant digits
    pub fn round(&self, value: &BigDecimal) -> BigDecimal {
        value.with_precision_round(self.precision, self.rounding)
    }
}

// ============================================================================
// Integer Conversions
// ============================================================================

/// Integer part of `value`, truncated towards zero
pub fn truncate_to_bigint(value: &BigDecimal) -> BigInt {
    let (mantissa, _) = value.with_scale_round(0, RoundingMode::Down).into_bigint_and_exponent();
    mantissa
}

/// `value` rounded half-up to an integer, clamped at zero
pub fn round_to_biguint(value: &BigDecimal) -> BigUint {
    let (mantissa, _) = value.with_scale_round(0, RoundingMode::HalfUp).into_bigint_and_exponent();
    mantissa.to_biguint().unwrap_or_default()
}

/// Lift an unsigned integer into a decimal
pub fn from_biguint(value: &BigUint) -> BigDecimal {
    BigDecimal::new(to_signed(value), 0)
}

/// Lift a signed integer into a decimal
pub fn from_bigint(value: &BigInt) -> BigDecimal {
    BigDecimal::new(value.clone(), 0)
}

/// Render without exponent notation or trailing fractional zeros
pub fn to_plain_string(value: &BigDecimal) -> String {
    value.normalized().to_plain_string()
}

// ============================================================================
// Config Encoding
// ============================================================================

/// Serde encoding of [`RoundingMode`] as a snake_case name
pub mod rounding_mode_serde {
    use super::RoundingMode;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(mode: &RoundingMode, serializer: S) -> Result<S::Ok, S::Error> {
        let name = match mode {
            RoundingMode::Up => "up",
            RoundingMode::Down => "down",
            RoundingMode::Ceiling => "ceiling",
            RoundingMode::Floor => "floor",
            RoundingMode::HalfUp => "half_up",
            RoundingMode::HalfDown => "half_down",
            RoundingMode::HalfEven => "half_even",
        };
        serializer.serialize_str(name)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RoundingMode, D::Error> {
        let name = String::deserialize(deserializer)?;
        match name.as_str() {
            "up" => Ok(RoundingMode::Up),
            "down" => Ok(RoundingMode::Down),
            "ceiling" => Ok(RoundingMode::Ceiling),
            "floor" => Ok(RoundingMode::Floor),
            "half_up" => Ok(RoundingMode::HalfUp),
            "half_down" => Ok(RoundingMode::HalfDown),
            "half_even" => Ok(RoundingMode::HalfEven),
            other => Err(serde::de::Error::custom(format!("unknown rounding mode: {}", other))),
        }
    }
}
