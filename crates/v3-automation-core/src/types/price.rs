//! # Price Type
//!
//! A directional price: raw units of `quote` per raw unit of `base`, kept as an
//! exact fraction. Human-readable values scale by both tokens' decimals.

use std::cmp::Ordering;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint};
use num_traits::{Signed, Zero};

use crate::errors::{AutomationError, CoreResult};
use crate::math::big_int::{count_digits, pow10, to_signed, to_unsigned_saturating};
use crate::math::decimal::{from_bigint, DecimalContext};
use crate::types::token::Token;

/// Price of `base` denominated in `quote`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    pub base: Token,
    pub quote: Token,
    pub(crate) numerator: BigInt,
    pub(crate) denominator: BigInt,
}

impl Price {
    /// Create the price `numerator / denominator` in raw quote units per raw base unit
    pub fn from_ratio(
        base: Token,
        quote: Token,
        numerator: impl Into<BigInt>,
        denominator: impl Into<BigInt>,
    ) -> CoreResult<Self> {
        let numerator = numerator.into();
        let denominator = denominator.into();
        if denominator.is_zero() {
            return Err(AutomationError::DivisionByZero);
        }
        if numerator.is_negative() || denominator.is_negative() {
            return Err(AutomationError::invalid_price(&format!("{}/{}", numerator, denominator)));
        }
        Ok(Self { base, quote, numerator, denominator })
    }

    /// Raw numerator
    pub fn numerator(&self) -> &BigInt {
        &self.numerator
    }

    /// Raw denominator
    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    /// Whether the quote side is zero
    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    /// Price of `quote` denominated in `base`
    ///
    /// Fails with `DivisionByZero` for a zero price.
    pub fn invert(&self) -> CoreResult<Price> {
        Price::from_ratio(
            self.quote.clone(),
            self.base.clone(),
            self.denominator.clone(),
            self.numerator.clone(),
        )
    }

    /// Compare raw values, ignoring token metadata
    pub fn cmp_raw(&self, other: &Price) -> Ordering {
        (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
    }

    /// Convert an amount of `base` into `quote`, rounding down
    pub fn quote(&self, base_amount: &BigUint) -> BigUint {
        let quoted = to_signed(base_amount) * &self.numerator / &self.denominator;
        to_unsigned_saturating(&quoted)
    }

    /// Sum of two prices with the same orientation
    pub fn add(&self, other: &Price) -> CoreResult<Price> {
        self.check_same_pair(other)?;
        Price::from_ratio(
            self.base.clone(),
            self.quote.clone(),
            &self.numerator * &other.denominator + &other.numerator * &self.denominator,
            &self.denominator * &other.denominator,
        )
    }

    /// Difference of two prices with the same orientation
    ///
    /// Fails with `InvalidPriceFormat` if the result would be negative.
    pub fn sub(&self, other: &Price) -> CoreResult<Price> {
        self.check_same_pair(other)?;
        Price::from_ratio(
            self.base.clone(),
            self.quote.clone(),
            &self.numerator * &other.denominator - &other.numerator * &self.denominator,
            &self.denominator * &other.denominator,
        )
    }

    /// Human-readable fraction: raw value scaled by 10^base.decimals / 10^quote.decimals
    pub fn adjusted_fraction(&self) -> (BigInt, BigInt) {
        (
            &self.numerator * pow10(self.base.decimals as u64),
            &self.denominator * pow10(self.quote.decimals as u64),
        )
    }

    /// Human-readable price as a decimal
    pub fn to_adjusted_decimal(&self, ctx: &DecimalContext) -> CoreResult<BigDecimal> {
        let (numerator, denominator) = self.adjusted_fraction();
        let ctx = ctx.with_min_precision(count_digits(&denominator));
        ctx.div(&from_bigint(&numerator), &from_bigint(&denominator))
    }

    fn check_same_pair(&self, other: &Price) -> CoreResult<()> {
        if self.base != other.base || self.quote != other.quote {
            return Err(AutomationError::invalid_price("prices must share base and quote tokens"));
        }
        Ok(())
    }
}
