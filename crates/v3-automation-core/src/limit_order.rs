//! # Limit Order Ranges
//!
//! A range order acts as a limit order: liquidity placed entirely on one side
//! of the current price is converted to the other token as the price crosses
//! the range. The narrowest such range is a whole number of tick spacings
//! centred as close as possible to the target tick.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{AutomationError, CoreResult};
use crate::math::price_math::price_to_closest_tick_safe;
use crate::math::tick_math::{check_tick_spacing, max_usable_tick, min_usable_tick};
use crate::types::pool::Pool;
use crate::types::price::Price;

/// Single-sided range around a target tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitOrderRange {
    /// Midpoint of the range, rounded down
    pub tick_avg: i32,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

/// Range of `tick_spacing * width_multiplier` ticks whose midpoint is closest to `tick`
///
/// The range is shifted inwards when it would cross the usable tick bounds.
/// Near those bounds `tick_avg` can then sit more than one spacing from
/// `tick`: `limit_order_range(887272, 200, 2)` is `[886800, 887200)` with
/// `tick_avg` 887000.
pub fn limit_order_range(tick: i32, tick_spacing: i32, width_multiplier: u32) -> CoreResult<LimitOrderRange> {
    check_tick_spacing(tick_spacing)?;
    if width_multiplier == 0 {
        return Err(AutomationError::InvalidTickRange);
    }

    let spacing = tick_spacing as i64;
    let width = spacing * width_multiplier as i64;
    let min_tick = min_usable_tick(tick_spacing) as i64;
    let max_tick = max_usable_tick(tick_spacing) as i64;
    if width > max_tick - min_tick {
        return Err(AutomationError::InvalidWidth(width.min(i32::MAX as i64) as i32));
    }

    let mut tick_lower = (2 * tick as i64 - width + spacing).div_euclid(2 * spacing) * spacing;
    if tick_lower < min_tick {
        tick_lower = min_tick;
    } else if tick_lower + width > max_tick {
        tick_lower = max_tick - width;
    }
    let tick_upper = tick_lower + width;
    let tick_avg = (tick_lower + tick_upper).div_euclid(2);

    debug!(
        "Limit order range for tick {}: [{}, {}) avg {}",
        tick, tick_lower, tick_upper, tick_avg
    );

    Ok(LimitOrderRange {
        tick_avg: tick_avg as i32,
        tick_lower: tick_lower as i32,
        tick_upper: tick_upper as i32,
    })
}

/// Range for a target exit price, in either orientation
pub fn limit_order_range_for_price(
    price: &Price,
    tick_spacing: i32,
    width_multiplier: u32,
) -> CoreResult<LimitOrderRange> {
    limit_order_range(price_to_closest_tick_safe(price)?, tick_spacing, width_multiplier)
}

/// Check that `range` is single-sided for the order direction
///
/// Selling token0 (`zero_for_one`) needs the range strictly above the current
/// tick; selling token1 needs it at or below.
pub fn validate_limit_order_side(pool: &Pool, range: &LimitOrderRange, zero_for_one: bool) -> CoreResult<()> {
    if range.tick_lower >= range.tick_upper {
        return Err(AutomationError::InvalidTickRange);
    }
    if zero_for_one && range.tick_lower <= pool.tick_current {
        return Err(AutomationError::InconsistentThreshold(
            "a token0 limit order must sit above the current tick",
        ));
    }
    if !zero_for_one && range.tick_upper > pool.tick_current {
        return Err(AutomationError::InconsistentThreshold(
            "a token1 limit order must sit at or below the current tick",
        ));
    }
    Ok(())
}
