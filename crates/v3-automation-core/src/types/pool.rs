//! # Pool Snapshot
//!
//! Immutable AMM state at a block. Tokens are held in canonical address order
//! and the current tick is checked against the sqrt price on construction.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::constants::{FEE_HIGH, FEE_LOW, FEE_LOWEST, FEE_MEDIUM, Q192};
use crate::errors::{AutomationError, CoreResult};
use crate::math::big_int::to_signed;
use crate::math::tick_math::{check_tick_spacing, get_tick_at_sqrt_ratio};
use crate::types::price::Price;
use crate::types::token::{sort_tokens, Token};

/// Standard fee tiers, in hundredths of a basis point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum FeeTier {
    Lowest,
    Low,
    Medium,
    High,
}

impl FeeTier {
    /// Fee in hundredths of a basis point
    pub const fn fee(self) -> u32 {
        match self {
            FeeTier::Lowest => FEE_LOWEST,
            FeeTier::Low => FEE_LOW,
            FeeTier::Medium => FEE_MEDIUM,
            FeeTier::High => FEE_HIGH,
        }
    }

    /// Tick spacing the factory enables for this fee
    pub const fn tick_spacing(self) -> i32 {
        match self {
            FeeTier::Lowest => 1,
            FeeTier::Low => 10,
            FeeTier::Medium => 60,
            FeeTier::High => 200,
        }
    }

    /// All standard tiers, lowest first
    pub const ALL: [FeeTier; 4] = [FeeTier::Lowest, FeeTier::Low, FeeTier::Medium, FeeTier::High];
}

impl TryFrom<u32> for FeeTier {
    type Error = AutomationError;

    fn try_from(fee: u32) -> Result<Self, Self::Error> {
        FeeTier::ALL
            .into_iter()
            .find(|tier| tier.fee() == fee)
            .ok_or(AutomationError::InvalidPoolState("unknown fee tier"))
    }
}

impl From<FeeTier> for u32 {
    fn from(tier: FeeTier) -> Self {
        tier.fee()
    }
}

/// Pool state snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    pub token0: Token,
    pub token1: Token,
    /// Fee in hundredths of a basis point
    pub fee: u32,
    pub tick_spacing: i32,
    pub sqrt_price_x96: BigUint,
    /// In-range liquidity
    pub liquidity: u128,
    pub tick_current: i32,
}

impl Pool {
    /// Create a snapshot of a standard fee-tier pool
    pub fn new(
        token_a: Token,
        token_b: Token,
        fee: FeeTier,
        sqrt_price_x96: BigUint,
        liquidity: u128,
        tick_current: i32,
    ) -> CoreResult<Self> {
        Self::with_tick_spacing(
            token_a,
            token_b,
            fee.fee(),
            fee.tick_spacing(),
            sqrt_price_x96,
            liquidity,
            tick_current,
        )
    }

    /// Create a snapshot for a fork whose pools are keyed by tick spacing
    pub fn with_tick_spacing(
        token_a: Token,
        token_b: Token,
        fee: u32,
        tick_spacing: i32,
        sqrt_price_x96: BigUint,
        liquidity: u128,
        tick_current: i32,
    ) -> CoreResult<Self> {
        check_tick_spacing(tick_spacing)?;
        if token_a.chain_id != token_b.chain_id {
            return Err(AutomationError::InvalidPoolState("tokens are on different chains"));
        }
        let (token0, token1) = sort_tokens(token_a, token_b)?;

        let expected_tick = get_tick_at_sqrt_ratio(&sqrt_price_x96)
            .map_err(|_| AutomationError::InvalidPoolState("sqrt price out of bounds"))?;
        if expected_tick != tick_current {
            return Err(AutomationError::InvalidPoolState("tick does not match sqrt price"));
        }

        Ok(Self {
            token0,
            token1,
            fee,
            tick_spacing,
            sqrt_price_x96,
            liquidity,
            tick_current,
        })
    }

    /// Whether `token` is one of the pool's tokens
    pub fn involves_token(&self, token: &Token) -> bool {
        *token == self.token0 || *token == self.token1
    }

    /// Current price of token0 in token1
    pub fn token0_price(&self) -> Price {
        let ratio_x192 = to_signed(&(&self.sqrt_price_x96 * &self.sqrt_price_x96));
        Price {
            base: self.token0.clone(),
            quote: self.token1.clone(),
            numerator: ratio_x192,
            denominator: to_signed(&Q192),
        }
    }

    /// Current price of token1 in token0
    pub fn token1_price(&self) -> Price {
        let ratio_x192 = to_signed(&(&self.sqrt_price_x96 * &self.sqrt_price_x96));
        Price {
            base: self.token1.clone(),
            quote: self.token0.clone(),
            numerator: to_signed(&Q192),
            denominator: ratio_x192,
        }
    }

    /// Current price of `token` denominated in the other token
    pub fn price_of(&self, token: &Token) -> CoreResult<Price> {
        if *token == self.token0 {
            Ok(self.token0_price())
        } else if *token == self.token1 {
            Ok(self.token1_price())
        } else {
            Err(AutomationError::InvalidPoolState("token is not in the pool"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q96;
    use crate::math::tick_math::get_sqrt_ratio_at_tick;
    use std::cmp::Ordering;

    fn tokens() -> (Token, Token) {
        (
            Token::new(1, "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599", 8, Some("WBTC")).unwrap(),
            Token::new(1, "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", 18, Some("WETH")).unwrap(),
        )
    }

    #[test]
    fn test_fee_tier_spacing() {
        assert_eq!(FeeTier::Lowest.tick_spacing(), 1);
        assert_eq!(FeeTier::Low.tick_spacing(), 10);
        assert_eq!(FeeTier::Medium.tick_spacing(), 60);
        assert_eq!(FeeTier::High.tick_spacing(), 200);
        assert_eq!(FeeTier::try_from(3000).unwrap(), FeeTier::Medium);
        assert!(FeeTier::try_from(2500).is_err());
    }

    #[test]
    fn test_pool_sorts_tokens() {
        let (wbtc, weth) = tokens();
        let pool = Pool::new(weth.clone(), wbtc.clone(), FeeTier::Medium, Q96.clone(), 0, 0).unwrap();
        assert_eq!(pool.token0, wbtc);
        assert_eq!(pool.token1, weth);
        assert_eq!(pool.tick_spacing, 60);
    }

    #[test]
    fn test_pool_validation() {
        let (wbtc, weth) = tokens();
        assert_eq!(
            Pool::new(wbtc.clone(), wbtc.clone(), FeeTier::Low, Q96.clone(), 0, 0),
            Err(AutomationError::IdenticalTokens)
        );
        assert!(matches!(
            Pool::new(wbtc.clone(), weth.clone(), FeeTier::Low, Q96.clone(), 0, 1),
            Err(AutomationError::InvalidPoolState(_))
        ));
        assert!(matches!(
            Pool::new(wbtc.clone(), weth.clone(), FeeTier::Low, BigUint::from(1u8), 0, 0),
            Err(AutomationError::InvalidPoolState(_))
        ));
        assert_eq!(
            Pool::with_tick_spacing(wbtc, weth, 3000, 0, Q96.clone(), 0, 0),
            Err(AutomationError::InvalidTickSpacing(0))
        );
    }

    #[test]
    fn test_pool_prices_are_inverse() {
        let (wbtc, weth) = tokens();
        let tick = 257_000;
        let sqrt = get_sqrt_ratio_at_tick(tick).unwrap();
        let pool = Pool::new(wbtc.clone(), weth, FeeTier::Medium, sqrt, 10u128.pow(18), tick).unwrap();

        let token0_price = pool.token0_price();
        assert_eq!(token0_price.invert().unwrap(), pool.token1_price());
        assert_eq!(pool.price_of(&wbtc).unwrap(), token0_price);
        assert_eq!(pool.token0_price().cmp_raw(&pool.token1_price()), Ordering::Greater);
    }
}
