//! # Liquidity Position
//!
//! A range of liquidity in a pool. Token amounts are derived from the pool's
//! current sqrt price and the range bounds; only the liquidity is stored.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::constants::{MAX_TICK, MIN_TICK};
use crate::errors::{AutomationError, CoreResult};
use crate::math::big_int::to_u128;
use crate::math::liquidity_math::{get_amount_0_delta, get_amount_1_delta, max_liquidity_for_amounts};
use crate::math::tick_math::get_sqrt_ratio_at_tick;
use crate::types::pool::Pool;

/// Liquidity position over `[tick_lower, tick_upper)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub pool: Pool,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
}

impl Position {
    /// Create a position, validating the range against the pool's tick spacing
    pub fn new(pool: Pool, tick_lower: i32, tick_upper: i32, liquidity: u128) -> CoreResult<Self> {
        check_range(&pool, tick_lower, tick_upper)?;
        Ok(Self {
            pool,
            tick_lower,
            tick_upper,
            liquidity,
        })
    }

    /// Position holding the maximum liquidity mintable from the given amounts
    ///
    /// `use_full_precision = false` truncates the token0 intermediate the way the
    /// periphery contracts do, so the result matches an on-chain mint.
    pub fn from_amounts(
        pool: Pool,
        tick_lower: i32,
        tick_upper: i32,
        amount0: &BigUint,
        amount1: &BigUint,
        use_full_precision: bool,
    ) -> CoreResult<Self> {
        check_range(&pool, tick_lower, tick_upper)?;
        let liquidity = max_liquidity_for_amounts(
            &pool.sqrt_price_x96,
            &get_sqrt_ratio_at_tick(tick_lower)?,
            &get_sqrt_ratio_at_tick(tick_upper)?,
            amount0,
            amount1,
            use_full_precision,
        )?;
        Self::new(pool, tick_lower, tick_upper, to_u128(&liquidity)?)
    }

    /// Position holding only token0
    pub fn from_amount0(
        pool: Pool,
        tick_lower: i32,
        tick_upper: i32,
        amount0: &BigUint,
        use_full_precision: bool,
    ) -> CoreResult<Self> {
        // Cap token1 at the largest value so token0 is the limiting side
        let unlimited = BigUint::from(u128::MAX) << 128;
        Self::from_amounts(pool, tick_lower, tick_upper, amount0, &unlimited, use_full_precision)
    }

    /// Position holding only token1
    pub fn from_amount1(pool: Pool, tick_lower: i32, tick_upper: i32, amount1: &BigUint) -> CoreResult<Self> {
        let unlimited = BigUint::from(u128::MAX) << 128;
        Self::from_amounts(pool, tick_lower, tick_upper, &unlimited, amount1, true)
    }

    /// Whether the pool's current tick lies inside the range
    pub fn in_range(&self) -> bool {
        self.tick_lower <= self.pool.tick_current && self.pool.tick_current < self.tick_upper
    }

    /// Amount of token0 the position currently holds
    pub fn amount0(&self) -> CoreResult<BigUint> {
        let sqrt_upper = get_sqrt_ratio_at_tick(self.tick_upper)?;
        if self.pool.tick_current < self.tick_lower {
            get_amount_0_delta(&get_sqrt_ratio_at_tick(self.tick_lower)?, &sqrt_upper, self.liquidity, false)
        } else if self.pool.tick_current < self.tick_upper {
            get_amount_0_delta(&self.pool.sqrt_price_x96, &sqrt_upper, self.liquidity, false)
        } else {
            Ok(BigUint::zero())
        }
    }

    /// Amount of token1 the position currently holds
    pub fn amount1(&self) -> CoreResult<BigUint> {
        let sqrt_lower = get_sqrt_ratio_at_tick(self.tick_lower)?;
        if self.pool.tick_current < self.tick_lower {
            Ok(BigUint::zero())
        } else if self.pool.tick_current < self.tick_upper {
            get_amount_1_delta(&sqrt_lower, &self.pool.sqrt_price_x96, self.liquidity, false)
        } else {
            get_amount_1_delta(&sqrt_lower, &get_sqrt_ratio_at_tick(self.tick_upper)?, self.liquidity, false)
        }
    }

    /// Position equity denominated in raw token1 units at the current price
    pub fn value_in_token1(&self) -> CoreResult<BigUint> {
        let amount0 = self.amount0()?;
        let amount1 = self.amount1()?;
        Ok(self.pool.token0_price().quote(&amount0) + amount1)
    }
}

fn check_range(pool: &Pool, tick_lower: i32, tick_upper: i32) -> CoreResult<()> {
    if tick_lower >= tick_upper {
        return Err(AutomationError::InvalidTickRange);
    }
    if tick_lower < MIN_TICK {
        return Err(AutomationError::OutOfRangeTick(tick_lower));
    }
    if tick_upper > MAX_TICK {
        return Err(AutomationError::OutOfRangeTick(tick_upper));
    }
    for tick in [tick_lower, tick_upper] {
        if tick % pool.tick_spacing != 0 {
            return Err(AutomationError::UnusableTick {
                tick,
                tick_spacing: pool.tick_spacing,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::pool::FeeTier;
    use crate::types::token::Token;

    fn pool_at(tick: i32) -> Pool {
        let usdc = Token::new(1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", 6, Some("USDC")).unwrap();
        let weth = Token::new(1, "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", 18, Some("WETH")).unwrap();
        let sqrt = get_sqrt_ratio_at_tick(tick).unwrap();
        Pool::new(usdc, weth, FeeTier::Low, sqrt, 10u128.pow(20), tick).unwrap()
    }

    #[test]
    fn test_range_validation() {
        let pool = pool_at(200_000);
        assert_eq!(
            Position::new(pool.clone(), 100, 100, 1),
            Err(AutomationError::InvalidTickRange)
        );
        assert_eq!(
            Position::new(pool.clone(), 105, 200, 1),
            Err(AutomationError::UnusableTick { tick: 105, tick_spacing: 10 })
        );
        assert_eq!(
            Position::new(pool, -887_280, 0, 1),
            Err(AutomationError::OutOfRangeTick(-887_280))
        );
    }

    #[test]
    fn test_amounts_by_side() {
        let liquidity = 10u128.pow(18);

        // Price above the range: token1 only
        let above = Position::new(pool_at(200_000), 190_000, 195_000, liquidity).unwrap();
        assert!(above.amount0().unwrap().is_zero());
        assert!(!above.amount1().unwrap().is_zero());

        // Price below the range: token0 only
        let below = Position::new(pool_at(200_000), 205_000, 210_000, liquidity).unwrap();
        assert!(!below.amount0().unwrap().is_zero());
        assert!(below.amount1().unwrap().is_zero());

        let inside = Position::new(pool_at(200_000), 195_000, 205_000, liquidity).unwrap();
        assert!(inside.in_range());
        assert!(!inside.amount0().unwrap().is_zero());
        assert!(!inside.amount1().unwrap().is_zero());
    }

    #[test]
    fn test_mint_from_amounts_round_trip() {
        let pool = pool_at(200_000);
        let position = Position::new(pool.clone(), 195_000, 205_000, 10u128.pow(18)).unwrap();
        let amount0 = position.amount0().unwrap();
        let amount1 = position.amount1().unwrap();

        let minted = Position::from_amounts(pool, 195_000, 205_000, &amount0, &amount1, true).unwrap();
        let diff = position.liquidity.abs_diff(minted.liquidity);
        assert!(diff * 1_000_000 <= position.liquidity);
    }

    #[test]
    fn test_single_sided_mint() {
        let pool = pool_at(200_000);
        let amount0 = BigUint::from(10u64.pow(9));
        let position = Position::from_amount0(pool.clone(), 205_000, 210_000, &amount0, true).unwrap();
        assert!(position.amount1().unwrap().is_zero());
        assert!(position.amount0().unwrap() <= amount0);

        let amount1 = BigUint::from(10u64.pow(18));
        let position = Position::from_amount1(pool, 190_000, 195_000, &amount1).unwrap();
        assert!(position.amount0().unwrap().is_zero());
        assert!(position.amount1().unwrap() <= amount1);
    }

    #[test]
    fn test_value_in_token1() {
        let position = Position::new(pool_at(200_000), 190_000, 195_000, 10u128.pow(18)).unwrap();
        assert_eq!(position.value_in_token1().unwrap(), position.amount1().unwrap());
    }
}
