//! # Recurring Condition Translation
//!
//! Turns a recurring trigger, expressed relative to the pool at creation
//! time, into an absolute [`PriceCondition`] on the raw token1/token0 price.
//!
//! Thresholds move in opposite directions when a price is inverted: a
//! higher price of token1 in token0 is a lower price of token0 in token1.
//! Likewise a larger token0 value share means a lower price, so the `lte`
//! proportion yields the `gte` threshold.

use std::cmp::Ordering;

use bigdecimal::BigDecimal;
use tracing::debug;

use crate::errors::{AutomationError, CoreResult};
use crate::math::decimal::{to_plain_string, DecimalContext};
use crate::math::price_math::{parse_price, price_to_big_decimal, tick_to_big_price};
use crate::math::proportion::price_ratio_from_token0_proportion;
use crate::types::condition::{Condition, PriceCondition};
use crate::types::pool::Pool;
use crate::types::price::Price;

/// Translate a recurring condition against the current pool state
///
/// `range` is the position's `(tick_lower, tick_upper)` and is required for
/// [`Condition::RecurringRatio`].
pub fn translate_recurring(
    condition: &Condition,
    pool: &Pool,
    range: Option<(i32, i32)>,
    ctx: &DecimalContext,
) -> CoreResult<PriceCondition> {
    condition.validate()?;

    match condition {
        Condition::RecurringPercentage {
            gte_tick_offset,
            lte_tick_offset,
            duration_sec,
        } => {
            debug!(
                "Translating tick offsets gte={:?} lte={:?} at tick {}",
                gte_tick_offset, lte_tick_offset, pool.tick_current
            );
            let price_at_offset = |offset: i32| -> CoreResult<BigDecimal> {
                let tick = pool
                    .tick_current
                    .checked_add(offset)
                    .ok_or(AutomationError::OutOfRangeTick(i32::MAX))?;
                tick_to_big_price(tick, ctx)
            };
            let gte = gte_tick_offset.map(&price_at_offset).transpose()?;
            let lte = lte_tick_offset.map(&price_at_offset).transpose()?;
            PriceCondition::new(gte.as_ref(), lte.as_ref(), *duration_sec)
        }

        Condition::RecurringPrice {
            base_token,
            gte_price_offset,
            lte_price_offset,
            duration_sec,
        } => {
            debug!(
                "Translating price offsets gte={:?} lte={:?} for base token {}",
                gte_price_offset, lte_price_offset, base_token
            );
            let current = if *base_token == 0 {
                pool.token0_price()
            } else {
                pool.token1_price()
            };

            let gte = gte_price_offset
                .as_ref()
                .map(|offset| shift_price(&current, offset, false))
                .transpose()?;
            let lte = lte_price_offset
                .as_ref()
                .map(|offset| shift_price(&current, offset, true))
                .transpose()?;

            let (gte, lte) = if *base_token == 0 {
                (gte, lte)
            } else {
                // Back to token0 pricing; the bounds swap
                (lte.map(|p| p.invert()).transpose()?, gte.map(|p| p.invert()).transpose()?)
            };

            let gte = gte.map(|p| price_to_big_decimal(&p, ctx)).transpose()?;
            let lte = lte.map(|p| price_to_big_decimal(&p, ctx)).transpose()?;
            PriceCondition::new(gte.as_ref(), lte.as_ref(), *duration_sec)
        }

        Condition::RecurringRatio {
            gte_token0_value_proportion,
            lte_token0_value_proportion,
            duration_sec,
        } => {
            let (tick_lower, tick_upper) = range.ok_or(AutomationError::MissingTickRange)?;
            let current = price_to_big_decimal(&pool.token0_price(), ctx)?;
            debug!(
                "Translating proportions gte={:?} lte={:?} over [{}, {}) at price {}",
                gte_token0_value_proportion, lte_token0_value_proportion, tick_lower, tick_upper, current
            );

            let gte = lte_token0_value_proportion
                .as_ref()
                .map(|p| price_ratio_from_token0_proportion(tick_lower, tick_upper, p, ctx))
                .transpose()?;
            let lte = gte_token0_value_proportion
                .as_ref()
                .map(|p| price_ratio_from_token0_proportion(tick_lower, tick_upper, p, ctx))
                .transpose()?;

            if gte.as_ref().is_some_and(|gte| *gte <= current) {
                return Err(AutomationError::InconsistentThreshold(
                    "gte price must be above the current price",
                ));
            }
            if lte.as_ref().is_some_and(|lte| *lte >= current) {
                return Err(AutomationError::InconsistentThreshold(
                    "lte price must be below the current price",
                ));
            }
            PriceCondition::new(gte.as_ref(), lte.as_ref(), *duration_sec)
        }

        Condition::Time { .. }
        | Condition::TokenAmount { .. }
        | Condition::Price(_)
        | Condition::AccruedFees { .. } => Err(AutomationError::InvalidOffsetSpecification(
            "only recurring conditions can be translated",
        )),
    }
}

/// `current` moved by a human price `offset`, downwards when `down`
fn shift_price(current: &Price, offset: &BigDecimal, down: bool) -> CoreResult<Price> {
    let magnitude = to_plain_string(&offset.abs());
    let delta = parse_price(&current.base, &current.quote, &magnitude)?;
    if !down {
        return current.add(&delta);
    }
    if current.cmp_raw(&delta) != Ordering::Greater {
        return Err(AutomationError::InconsistentThreshold(
            "lte price offset must leave a positive price",
        ));
    }
    current.sub(&delta)
}
