//! Rebalance action parameters: the target range of a rebalance, either as
//! absolute ticks or as offsets from the pool's current tick.

use serde::{Deserialize, Serialize};

use crate::errors::{AutomationError, CoreResult};
use crate::math::decimal::DecimalContext;
use crate::math::tick_math::nearest_usable_tick;
use crate::projection::rebalanced_position;
use crate::types::pool::Pool;
use crate::types::position::Position;

/// Target range of a rebalance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RebalanceAction {
    #[serde(rename_all = "camelCase")]
    Absolute { tick_lower: i32, tick_upper: i32 },

    /// Offsets are added to the current tick and snapped to usable ticks
    #[serde(rename_all = "camelCase")]
    Offsets {
        tick_lower_offset: i32,
        tick_upper_offset: i32,
    },
}

impl RebalanceAction {
    /// Concrete `(tick_lower, tick_upper)` for the pool's current state
    pub fn resolve(&self, pool: &Pool) -> CoreResult<(i32, i32)> {
        let (tick_lower, tick_upper) = match *self {
            RebalanceAction::Absolute { tick_lower, tick_upper } => {
                for tick in [tick_lower, tick_upper] {
                    if tick % pool.tick_spacing != 0 {
                        return Err(AutomationError::UnusableTick {
                            tick,
                            tick_spacing: pool.tick_spacing,
                        });
                    }
                }
                (tick_lower, tick_upper)
            }
            RebalanceAction::Offsets {
                tick_lower_offset,
                tick_upper_offset,
            } => {
                let lower = pool.tick_current.saturating_add(tick_lower_offset);
                let upper = pool.tick_current.saturating_add(tick_upper_offset);
                (
                    nearest_usable_tick(lower, pool.tick_spacing)?,
                    nearest_usable_tick(upper, pool.tick_spacing)?,
                )
            }
        };

        if tick_lower >= tick_upper {
            return Err(AutomationError::InvalidTickRange);
        }
        Ok((tick_lower, tick_upper))
    }

    /// Project `position` after this rebalance at the current price
    pub fn simulate(&self, position: &Position, ctx: &DecimalContext) -> CoreResult<Position> {
        let (tick_lower, tick_upper) = self.resolve(&position.pool)?;
        rebalanced_position(position, tick_lower, tick_upper, ctx)
    }
}
