//! # Position Projection
//!
//! Simulates what a position becomes after a rebalance or a price move.
//! Nothing here touches the chain; every projection is arithmetic over the
//! position's pool snapshot.

use bigdecimal::BigDecimal;
use tracing::debug;

use crate::errors::{AutomationError, CoreResult};
use crate::math::decimal::{from_biguint, round_to_biguint, DecimalContext};
use crate::math::price_math::{price_to_big_decimal, price_to_sqrt_ratio_x96};
use crate::math::proportion::token0_proportion_from_price_ratio;
use crate::math::tick_math::get_tick_at_sqrt_ratio;
use crate::types::pool::Pool;
use crate::types::position::Position;

/// Position with the same equity redeployed over `[new_tick_lower, new_tick_upper)`
///
/// Equity is valued in token1 at the current price and split according to
/// the token0 share the new range holds at that price. The split is minted
/// with the periphery rounding, so the result may leave dust of the
/// non-limiting token.
pub fn rebalanced_position(
    position: &Position,
    new_tick_lower: i32,
    new_tick_upper: i32,
    ctx: &DecimalContext,
) -> CoreResult<Position> {
    if new_tick_lower >= new_tick_upper {
        return Err(AutomationError::InvalidTickRange);
    }

    let pool = &position.pool;
    let price = pool.token0_price();
    let big_price = price_to_big_decimal(&price, ctx)?;
    let equity = from_biguint(&position.value_in_token1()?);

    let share = token0_proportion_from_price_ratio(new_tick_lower, new_tick_upper, &big_price, ctx)?;
    let amount1 = round_to_biguint(&(&(BigDecimal::from(1) - &share) * &equity));
    let amount0 = round_to_biguint(&ctx.div(&(&equity - &from_biguint(&amount1)), &big_price)?);

    debug!(
        "Rebalancing [{}, {}) -> [{}, {}): token0 share {}, amount0 {}, amount1 {}",
        position.tick_lower, position.tick_upper, new_tick_lower, new_tick_upper, share, amount0, amount1
    );

    Position::from_amounts(pool.clone(), new_tick_lower, new_tick_upper, &amount0, &amount1, false)
}

/// The same range and liquidity against a pool moved to the raw token1/token0 `new_price`
///
/// Prices outside the sqrt ratio bounds clamp to the nearest bound.
pub fn position_at_price(position: &Position, new_price: &BigDecimal) -> CoreResult<Position> {
    let pool = &position.pool;
    let sqrt_price_x96 = price_to_sqrt_ratio_x96(new_price);
    let tick_current = get_tick_at_sqrt_ratio(&sqrt_price_x96)?;

    debug!("Projecting position to price {} (tick {})", new_price, tick_current);

    let moved = Pool::with_tick_spacing(
        pool.token0.clone(),
        pool.token1.clone(),
        pool.fee,
        pool.tick_spacing,
        sqrt_price_x96,
        pool.liquidity,
        tick_current,
    )?;
    Position::new(moved, position.tick_lower, position.tick_upper, position.liquidity)
}

/// Move the price to `new_price`, then rebalance into `[new_tick_lower, new_tick_upper)`
pub fn projected_rebalance_at_price(
    position: &Position,
    new_price: &BigDecimal,
    new_tick_lower: i32,
    new_tick_upper: i32,
    ctx: &DecimalContext,
) -> CoreResult<Position> {
    if new_tick_lower >= new_tick_upper {
        return Err(AutomationError::InvalidTickRange);
    }
    let moved = position_at_price(position, new_price)?;
    rebalanced_position(&moved, new_tick_lower, new_tick_upper, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::price_math::tick_to_big_price;
    use crate::math::tick_math::get_sqrt_ratio_at_tick;
    use crate::types::pool::FeeTier;
    use crate::types::token::Token;
    use num_bigint::BigUint;
    use num_traits::{ToPrimitive, Zero};

    fn in_range_position() -> Position {
        let wbtc = Token::new(1, "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599", 8, Some("WBTC")).unwrap();
        let weth = Token::new(1, "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", 18, Some("WETH")).unwrap();
        let tick = 257_000;
        let sqrt = get_sqrt_ratio_at_tick(tick).unwrap();
        let pool = Pool::new(wbtc, weth, FeeTier::Medium, sqrt, 10u128.pow(22), tick).unwrap();
        Position::new(pool, 253_320, 264_600, 10u128.pow(16)).unwrap()
    }

    fn relative_diff(a: &BigUint, b: &BigUint) -> f64 {
        let (a, b) = (a.to_f64().unwrap(), b.to_f64().unwrap());
        if a == b {
            0.0
        } else {
            (a - b).abs() / a.abs().max(b.abs())
        }
    }

    #[test]
    fn test_rebalance_preserves_equity() {
        let ctx = DecimalContext::default();
        let position = in_range_position();
        let rebalanced = rebalanced_position(&position, 255_000, 260_040, &ctx).unwrap();

        let before = position.value_in_token1().unwrap();
        let after = rebalanced.value_in_token1().unwrap();
        assert!(relative_diff(&before, &after) < 1e-6);
    }

    #[test]
    fn test_rebalance_out_and_back() {
        let ctx = DecimalContext::default();
        let position = in_range_position();

        // Entirely above the current price: all token0
        let away = rebalanced_position(&position, 258_000, 259_980, &ctx).unwrap();
        assert!(away.amount1().unwrap().is_zero());

        let back = rebalanced_position(&away, position.tick_lower, position.tick_upper, &ctx).unwrap();
        assert!(relative_diff(&position.amount0().unwrap(), &back.amount0().unwrap()) < 1e-6);
        assert!(relative_diff(&position.amount1().unwrap(), &back.amount1().unwrap()) < 1e-6);
        assert!(
            relative_diff(&BigUint::from(position.liquidity), &BigUint::from(back.liquidity)) < 1e-6
        );
    }

    #[test]
    fn test_position_at_price() {
        let position = in_range_position();
        let price = tick_to_big_price(262_000, &DecimalContext::default()).unwrap();
        let moved = position_at_price(&position, &price).unwrap();

        assert_eq!(moved.liquidity, position.liquidity);
        assert_eq!(moved.tick_lower, position.tick_lower);
        assert!((261_999..=262_000).contains(&moved.pool.tick_current));
        assert!(moved.amount0().unwrap() < position.amount0().unwrap());
        assert!(moved.amount1().unwrap() > position.amount1().unwrap());
    }

    #[test]
    fn test_projected_rebalance() {
        let ctx = DecimalContext::default();
        let position = in_range_position();
        let price = tick_to_big_price(270_000, &ctx).unwrap();

        let projected = projected_rebalance_at_price(&position, &price, 267_000, 273_000, &ctx).unwrap();
        assert!(projected.in_range());
        assert!(projected.liquidity > 0);

        assert_eq!(
            projected_rebalance_at_price(&position, &price, 273_000, 267_000, &ctx),
            Err(AutomationError::InvalidTickRange)
        );
        assert_eq!(
            rebalanced_position(&position, 255_000, 255_000, &ctx),
            Err(AutomationError::InvalidTickRange)
        );
    }
}
