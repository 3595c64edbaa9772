//! # Token0 Value Proportion
//!
//! Closed-form conversion between a raw token1/token0 price and the share of a
//! position's value held in token0, for a fixed tick range.
//!
//! ## Derivation
//!
//! At unit liquidity with `s = sqrt(price)`, `l = sqrt(price_lower)` and
//! `u = sqrt(price_upper)` a position holds
//!
//! ```text
//! amount0 = 1/s - 1/u
//! amount1 = s - l
//! ```
//!
//! Valuing token0 in token1 (`value0 = amount0 * s^2`) and setting
//! `p = value0 / (value0 + amount1)` gives the quadratic
//!
//! ```text
//! (p - 1) s^2 + u(1 - 2p) s + p l u = 0
//! ```
//!
//! whose positive root is the sqrt price for proportion `p`. Liquidity scales
//! both amounts equally and cancels out of the ratio.

use bigdecimal::BigDecimal;
use num_bigint::BigUint;
use num_traits::{Signed, Zero};

use crate::constants::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, Q96};
use crate::errors::{AutomationError, CoreResult};
use crate::math::big_int::to_unsigned_saturating;
use crate::math::decimal::{from_biguint, truncate_to_bigint, DecimalContext};
use crate::math::price_math::{price_to_sqrt_ratio_x96, tick_to_big_price};
use crate::math::tick_math::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio};

/// Raw token1/token0 price at which a `[tick_lower, tick_upper)` position holds
/// `proportion` of its value in token0
pub fn price_ratio_from_token0_proportion(
    tick_lower: i32,
    tick_upper: i32,
    proportion: &BigDecimal,
    ctx: &DecimalContext,
) -> CoreResult<BigDecimal> {
    if tick_upper <= tick_lower {
        return Err(AutomationError::InvalidTickRange);
    }
    check_proportion(proportion)?;

    let one = BigDecimal::from(1);
    if proportion.is_zero() {
        return tick_to_big_price(tick_upper, ctx);
    }
    if *proportion == one {
        return tick_to_big_price(tick_lower, ctx);
    }

    let l = sqrt_price_at_tick(tick_lower, ctx)?;
    let u = sqrt_price_at_tick(tick_upper, ctx)?;
    let p = proportion;

    let a = p - &one;
    let two = BigDecimal::from(2);
    let b = &u * &(&one - &(p * &two));
    let c = p * &l * &u;

    let discriminant = &b * &b - BigDecimal::from(4) * &a * &c;
    let numerator = ctx.sqrt(&discriminant)? + &b;
    let denominator = BigDecimal::from(-2) * &a;
    let sqrt_price = ctx.div(&numerator, &denominator)?;

    Ok(ctx.round(&(&sqrt_price * &sqrt_price)))
}

/// Share of value held in token0 by a `[tick_lower, tick_upper)` position at
/// the raw token1/token0 `price`
///
/// Below the range the position is all token0 (`1`); at or above the upper
/// tick it is all token1 (`0`).
pub fn token0_proportion_from_price_ratio(
    tick_lower: i32,
    tick_upper: i32,
    price: &BigDecimal,
    ctx: &DecimalContext,
) -> CoreResult<BigDecimal> {
    if tick_upper <= tick_lower {
        return Err(AutomationError::InvalidTickRange);
    }

    let tick = get_tick_at_sqrt_ratio(&price_to_sqrt_ratio_x96(price))?;
    if tick < tick_lower {
        return Ok(BigDecimal::from(1));
    }
    if tick >= tick_upper {
        return Ok(BigDecimal::zero());
    }

    let one = BigDecimal::from(1);
    let s = ctx.sqrt(price)?;
    let l = sqrt_price_at_tick(tick_lower, ctx)?;
    let u = sqrt_price_at_tick(tick_upper, ctx)?;

    let amount0 = non_negative(ctx.div(&one, &s)? - ctx.div(&one, &u)?);
    let amount1 = non_negative(&s - &l);

    let value0 = amount0 * price;
    let total = &value0 + &amount1;
    if total.is_zero() {
        return Ok(BigDecimal::zero());
    }
    ctx.div(&value0, &total)
}

/// Tick range of `width` ticks whose token0 value share at `tick_current`
/// is approximately `proportion`
///
/// The lower tick is floored to a whole tick, so the share is only
/// approximate. Ticks are not aligned to any spacing.
pub fn tick_range_from_width_and_ratio(
    width: i32,
    tick_current: i32,
    proportion: &BigDecimal,
    ctx: &DecimalContext,
) -> CoreResult<(i32, i32)> {
    if width <= 0 {
        return Err(AutomationError::InvalidWidth(width));
    }
    check_proportion(proportion)?;

    let one = BigDecimal::from(1);
    let (tick_lower, tick_upper) = if proportion.is_zero() {
        (offset_tick(tick_current, -width)?, tick_current)
    } else if *proportion == one {
        (tick_current, offset_tick(tick_current, width)?)
    } else {
        let two = BigDecimal::from(2);
        let price = tick_to_big_price(tick_current, ctx)?;
        let a = proportion;
        let b = &(&one - &(a * &two)) * &ctx.sqrt(&price)?;
        let c = ctx.div(&(&price * &(a - &one)), &ctx.sqrt(&tick_to_big_price(width, ctx)?)?)?;

        let discriminant = &b * &b - a * &c * BigDecimal::from(4);
        let sqrt_price_lower = ctx.div(&(ctx.sqrt(&discriminant)? - &b), &(a * &two))?;

        let sqrt_ratio_lower_x96 = clamp_sqrt_ratio(to_unsigned_saturating(&truncate_to_bigint(
            &(sqrt_price_lower * from_biguint(&Q96)),
        )));
        let tick_lower = get_tick_at_sqrt_ratio(&sqrt_ratio_lower_x96)?;
        (tick_lower, offset_tick(tick_lower, width)?)
    };

    if tick_lower < MIN_TICK {
        return Err(AutomationError::OutOfRangeTick(tick_lower));
    }
    if tick_upper > MAX_TICK {
        return Err(AutomationError::OutOfRangeTick(tick_upper));
    }
    Ok((tick_lower, tick_upper))
}

fn offset_tick(tick: i32, delta: i32) -> CoreResult<i32> {
    tick.checked_add(delta)
        .ok_or(AutomationError::OutOfRangeTick(tick.saturating_add(delta)))
}

fn check_proportion(proportion: &BigDecimal) -> CoreResult<()> {
    if proportion.is_negative() || *proportion > BigDecimal::from(1) {
        return Err(AutomationError::InvalidProportion);
    }
    Ok(())
}

/// sqrt(price) at `tick`, read straight from the Q96 sqrt ratio
fn sqrt_price_at_tick(tick: i32, ctx: &DecimalContext) -> CoreResult<BigDecimal> {
    ctx.div(&from_biguint(&get_sqrt_ratio_at_tick(tick)?), &from_biguint(&Q96))
}

fn non_negative(value: BigDecimal) -> BigDecimal {
    if value.is_negative() {
        BigDecimal::zero()
    } else {
        value
    }
}

fn clamp_sqrt_ratio(sqrt_ratio_x96: BigUint) -> BigUint {
    if sqrt_ratio_x96 < *MIN_SQRT_RATIO {
        MIN_SQRT_RATIO.clone()
    } else if sqrt_ratio_x96 >= *MAX_SQRT_RATIO {
        &*MAX_SQRT_RATIO - 1u8
    } else {
        sqrt_ratio_x96
    }
}
