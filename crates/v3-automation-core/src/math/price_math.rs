//! # Price Math
//!
//! Conversions between ticks, sqrt ratios, rational [`Price`]s and decimal
//! prices. Raw prices are always token1 per token0 in raw token units; a
//! [`Price`] may point either way and is normalised before any tick lookup.
//!
//! ## Clamping
//!
//! Prices outside the representable tick range are not errors. Ticks clamp
//! to `[MIN_TICK, MAX_TICK]` and sqrt ratios to `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`.

use std::cmp::Ordering;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint};
use num_traits::{Signed, Zero};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, Q192};
use crate::errors::{AutomationError, CoreResult};
use crate::math::big_int::{count_digits, pow10, to_signed, to_unsigned_saturating};
use crate::math::decimal::{from_bigint, from_biguint, truncate_to_bigint, DecimalContext};
use crate::math::tick_math::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, nearest_usable_tick};
use crate::types::price::Price;
use crate::types::token::Token;

static PRICE_PATTERN: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(r"^\d*\.?\d+$"));

/// Lowest raw price representable by a sqrt ratio, as (numerator, denominator)
pub static MIN_PRICE: Lazy<(BigUint, BigUint)> =
    Lazy::new(|| (&*MIN_SQRT_RATIO * &*MIN_SQRT_RATIO, Q192.clone()));

/// Highest raw price strictly below MAX_SQRT_RATIO, as (numerator, denominator)
pub static MAX_PRICE: Lazy<(BigUint, BigUint)> =
    Lazy::new(|| (&*MAX_SQRT_RATIO * &*MAX_SQRT_RATIO - 1u8, Q192.clone()));

// ============================================================================
// Tick to Price
// ============================================================================

/// Price of `base` in `quote` encoded by a Q64.96 sqrt ratio
pub fn sqrt_ratio_to_price(sqrt_ratio_x96: &BigUint, base: &Token, quote: &Token) -> CoreResult<Price> {
    let ratio_x192 = sqrt_ratio_x96 * sqrt_ratio_x96;
    if base.sorts_before(quote)? {
        Price::from_ratio(base.clone(), quote.clone(), to_signed(&ratio_x192), to_signed(&Q192))
    } else {
        Price::from_ratio(base.clone(), quote.clone(), to_signed(&Q192), to_signed(&ratio_x192))
    }
}

/// Price of `base` in `quote` at `tick`
pub fn tick_to_price(base: &Token, quote: &Token, tick: i32) -> CoreResult<Price> {
    sqrt_ratio_to_price(&get_sqrt_ratio_at_tick(tick)?, base, quote)
}

/// Raw token1/token0 price at `tick` as a decimal
pub fn tick_to_big_price(tick: i32, ctx: &DecimalContext) -> CoreResult<BigDecimal> {
    let sqrt = get_sqrt_ratio_at_tick(tick)?;
    let ratio_x192 = &sqrt * &sqrt;
    let q192 = to_signed(&Q192);
    let ctx = ctx.with_min_precision(count_digits(&q192));
    ctx.div(&from_biguint(&ratio_x192), &from_bigint(&q192))
}

// ============================================================================
// Price to Tick
// ============================================================================

/// Closest tick at or below `price`, clamped to the tick bounds
///
/// The price is normalised to token1 per token0 first, so a price and its
/// inverse map to the same tick. A zero price maps to MIN_TICK when its base
/// is token0 and to MAX_TICK otherwise.
pub fn price_to_closest_tick_safe(price: &Price) -> CoreResult<i32> {
    let sorted = price.base.sorts_before(&price.quote)?;
    if price.numerator.is_zero() {
        return Ok(if sorted { MIN_TICK } else { MAX_TICK });
    }

    let (numerator, denominator) = if sorted {
        (to_unsigned_saturating(&price.numerator), to_unsigned_saturating(&price.denominator))
    } else {
        (to_unsigned_saturating(&price.denominator), to_unsigned_saturating(&price.numerator))
    };

    if cmp_fraction(&numerator, &denominator, &MIN_PRICE.0, &MIN_PRICE.1) == Ordering::Less {
        return Ok(MIN_TICK);
    }
    if cmp_fraction(&numerator, &denominator, &MAX_PRICE.0, &MAX_PRICE.1) != Ordering::Less {
        return Ok(MAX_TICK);
    }

    let sqrt_ratio_x96 = ((&numerator << 192usize) / &denominator).sqrt();
    let tick = get_tick_at_sqrt_ratio(&sqrt_ratio_x96)?;

    // The integer square root can land one tick low
    let tick = if tick < MAX_TICK {
        let next = get_sqrt_ratio_at_tick(tick + 1)?;
        let next_ratio = &next * &next;
        if cmp_fraction(&numerator, &denominator, &next_ratio, &Q192) != Ordering::Less {
            tick + 1
        } else {
            tick
        }
    } else {
        tick
    };

    Ok(tick.clamp(MIN_TICK, MAX_TICK))
}

/// Closest usable tick for `price` under `tick_spacing`
pub fn price_to_closest_usable_tick(price: &Price, tick_spacing: i32) -> CoreResult<i32> {
    nearest_usable_tick(price_to_closest_tick_safe(price)?, tick_spacing)
}

fn cmp_fraction(a_num: &BigUint, a_den: &BigUint, b_num: &BigUint, b_den: &BigUint) -> Ordering {
    (a_num * b_den).cmp(&(b_num * a_den))
}

// ============================================================================
// Decimal Conversions
// ============================================================================

/// Raw value of `price` as a decimal
///
/// Precision is raised to at least the digit count of the denominator so the
/// conversion does not truncate significant digits.
pub fn price_to_big_decimal(price: &Price, ctx: &DecimalContext) -> CoreResult<BigDecimal> {
    let ctx = ctx.with_min_precision(count_digits(&price.denominator));
    ctx.div(&from_bigint(&price.numerator), &from_bigint(&price.denominator))
}

/// Q64.96 sqrt ratio for a raw token1/token0 decimal price, clamped to the
/// valid sqrt ratio range
pub fn price_to_sqrt_ratio_x96(price: &BigDecimal) -> BigUint {
    if !price.is_positive() {
        return MIN_SQRT_RATIO.clone();
    }

    let scaled = truncate_to_bigint(&(price * &from_biguint(&Q192)));
    let sqrt_ratio_x96 = to_unsigned_saturating(&scaled).sqrt();

    if sqrt_ratio_x96 < *MIN_SQRT_RATIO {
        MIN_SQRT_RATIO.clone()
    } else if sqrt_ratio_x96 >= *MAX_SQRT_RATIO {
        &*MAX_SQRT_RATIO - 1u8
    } else {
        sqrt_ratio_x96
    }
}

/// Parse a human-readable price of `base` in `quote`
///
/// Accepts plain decimal strings such as `"1500"`, `"0.25"` or `".5"`. Fails
/// with `InvalidPriceFormat` on anything else.
pub fn parse_price(base: &Token, quote: &Token, price: &str) -> CoreResult<Price> {
    let pattern = PRICE_PATTERN
        .as_ref()
        .map_err(|e| AutomationError::config(format!("Failed to compile price pattern: {}", e)))?;
    if !pattern.is_match(price) {
        return Err(AutomationError::invalid_price(price));
    }

    let (whole, fraction) = price.split_once('.').unwrap_or((price, ""));
    let digits = format!("{}{}", whole, fraction);
    let digits = BigInt::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| AutomationError::invalid_price(price))?;

    let numerator = digits * pow10(quote.decimals as u64);
    let denominator = pow10(fraction.len() as u64 + base.decimals as u64);
    Price::from_ratio(base.clone(), quote.clone(), numerator, denominator)
}
