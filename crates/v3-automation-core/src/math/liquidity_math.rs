//! # Liquidity Math
//!
//! Calculations for concentrated liquidity positions, including amount0/amount1 deltas
//! and liquidity calculations from token amounts. All values are exact integers in Q96.

use num_bigint::BigUint;

use crate::constants::Q96;
use crate::errors::{AutomationError, CoreResult};
use crate::math::big_int::{div_rounding, mul_div, Rounding};

fn sorted<'a>(a: &'a BigUint, b: &'a BigUint) -> (&'a BigUint, &'a BigUint) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

fn rounding(round_up: bool) -> Rounding {
    if round_up {
        Rounding::Up
    } else {
        Rounding::Down
    }
}

/// Amount of token0 between two sqrt ratios for the given liquidity
pub fn get_amount_0_delta(
    sqrt_ratio_a_x96: &BigUint,
    sqrt_ratio_b_x96: &BigUint,
    liquidity: u128,
    round_up: bool,
) -> CoreResult<BigUint> {
    let (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    let numerator1 = BigUint::from(liquidity) << 96;
    let numerator2 = sqrt_ratio_b_x96 - sqrt_ratio_a_x96;
    let rounding = rounding(round_up);

    let intermediate = mul_div(&numerator1, &numerator2, sqrt_ratio_b_x96, rounding)?;
    div_rounding(&intermediate, sqrt_ratio_a_x96, rounding)
}

/// Amount of token1 between two sqrt ratios for the given liquidity
pub fn get_amount_1_delta(
    sqrt_ratio_a_x96: &BigUint,
    sqrt_ratio_b_x96: &BigUint,
    liquidity: u128,
    round_up: bool,
) -> CoreResult<BigUint> {
    let (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    mul_div(
        &BigUint::from(liquidity),
        &(sqrt_ratio_b_x96 - sqrt_ratio_a_x96),
        &Q96,
        rounding(round_up),
    )
}

/// Liquidity for a given amount of token0, computed without the intermediate truncation
pub fn max_liquidity_for_amount_0_precise(
    sqrt_ratio_a_x96: &BigUint,
    sqrt_ratio_b_x96: &BigUint,
    amount0: &BigUint,
) -> CoreResult<BigUint> {
    let (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    let numerator = amount0 * sqrt_ratio_a_x96 * sqrt_ratio_b_x96;
    let denominator = &*Q96 * (sqrt_ratio_b_x96 - sqrt_ratio_a_x96);
    div_rounding(&numerator, &denominator, Rounding::Down)
}

/// Liquidity for a given amount of token0, truncating `a * b / Q96` first as the
/// periphery contracts do
pub fn max_liquidity_for_amount_0_imprecise(
    sqrt_ratio_a_x96: &BigUint,
    sqrt_ratio_b_x96: &BigUint,
    amount0: &BigUint,
) -> CoreResult<BigUint> {
    let (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    let intermediate = mul_div(sqrt_ratio_a_x96, sqrt_ratio_b_x96, &Q96, Rounding::Down)?;
    mul_div(
        amount0,
        &intermediate,
        &(sqrt_ratio_b_x96 - sqrt_ratio_a_x96),
        Rounding::Down,
    )
}

/// Liquidity for a given amount of token1
pub fn max_liquidity_for_amount_1(
    sqrt_ratio_a_x96: &BigUint,
    sqrt_ratio_b_x96: &BigUint,
    amount1: &BigUint,
) -> CoreResult<BigUint> {
    let (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    mul_div(
        amount1,
        &Q96,
        &(sqrt_ratio_b_x96 - sqrt_ratio_a_x96),
        Rounding::Down,
    )
}

/// Maximum liquidity mintable from both amounts at the current sqrt ratio
pub fn max_liquidity_for_amounts(
    sqrt_ratio_current_x96: &BigUint,
    sqrt_ratio_a_x96: &BigUint,
    sqrt_ratio_b_x96: &BigUint,
    amount0: &BigUint,
    amount1: &BigUint,
    use_full_precision: bool,
) -> CoreResult<BigUint> {
    let (sqrt_ratio_a_x96, sqrt_ratio_b_x96) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    if sqrt_ratio_a_x96 == sqrt_ratio_b_x96 {
        return Err(AutomationError::InvalidTickRange);
    }

    let liquidity_for_amount_0 = |a: &BigUint, b: &BigUint| {
        if use_full_precision {
            max_liquidity_for_amount_0_precise(a, b, amount0)
        } else {
            max_liquidity_for_amount_0_imprecise(a, b, amount0)
        }
    };

    if sqrt_ratio_current_x96 <= sqrt_ratio_a_x96 {
        liquidity_for_amount_0(sqrt_ratio_a_x96, sqrt_ratio_b_x96)
    } else if sqrt_ratio_current_x96 < sqrt_ratio_b_x96 {
        let liquidity0 = liquidity_for_amount_0(sqrt_ratio_current_x96, sqrt_ratio_b_x96)?;
        let liquidity1 = max_liquidity_for_amount_1(sqrt_ratio_a_x96, sqrt_ratio_current_x96, amount1)?;
        Ok(liquidity0.min(liquidity1))
    } else {
        max_liquidity_for_amount_1(sqrt_ratio_a_x96, sqrt_ratio_b_x96, amount1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::get_sqrt_ratio_at_tick;
    use num_traits::Zero;

    #[test]
    fn test_amount_deltas() {
        let sqrt_lower = get_sqrt_ratio_at_tick(0).unwrap();
        let sqrt_upper = get_sqrt_ratio_at_tick(100).unwrap();
        let liquidity = 1_000_000_000u128;

        let amount0_down = get_amount_0_delta(&sqrt_lower, &sqrt_upper, liquidity, false).unwrap();
        let amount0_up = get_amount_0_delta(&sqrt_lower, &sqrt_upper, liquidity, true).unwrap();
        assert!(amount0_down > BigUint::zero());
        assert!(amount0_up >= amount0_down);

        let amount1_down = get_amount_1_delta(&sqrt_lower, &sqrt_upper, liquidity, false).unwrap();
        let amount1_up = get_amount_1_delta(&sqrt_lower, &sqrt_upper, liquidity, true).unwrap();
        assert!(amount1_down > BigUint::zero());
        assert!(amount1_up >= amount1_down);

        // Argument order does not matter
        assert_eq!(
            get_amount_1_delta(&sqrt_upper, &sqrt_lower, liquidity, false).unwrap(),
            amount1_down
        );
    }

    #[test]
    fn test_zero_width_deltas() {
        let sqrt = get_sqrt_ratio_at_tick(0).unwrap();
        assert!(get_amount_0_delta(&sqrt, &sqrt, 1000, false).unwrap().is_zero());
        assert!(get_amount_1_delta(&sqrt, &sqrt, 1000, false).unwrap().is_zero());
    }

    #[test]
    fn test_liquidity_round_trip() {
        let sqrt_lower = get_sqrt_ratio_at_tick(-600).unwrap();
        let sqrt_upper = get_sqrt_ratio_at_tick(600).unwrap();
        let liquidity = 10u128.pow(18);

        let amount0 = get_amount_0_delta(&sqrt_lower, &sqrt_upper, liquidity, false).unwrap();
        let amount1 = get_amount_1_delta(&sqrt_lower, &sqrt_upper, liquidity, false).unwrap();

        let from_0 = max_liquidity_for_amount_0_precise(&sqrt_lower, &sqrt_upper, &amount0).unwrap();
        let from_1 = max_liquidity_for_amount_1(&sqrt_lower, &sqrt_upper, &amount1).unwrap();

        // Truncating an amount by one unit costs up to liquidity / amount
        let expected = BigUint::from(liquidity);
        for (recovered, amount) in [(&from_0, &amount0), (&from_1, &amount1)] {
            assert!(recovered <= &expected);
            let per_unit = (&expected + amount - 1u8) / amount + 1u8;
            assert!(&expected - recovered <= per_unit);
        }
    }

    #[test]
    fn test_max_liquidity_in_range_takes_limiting_token() {
        let current = get_sqrt_ratio_at_tick(0).unwrap();
        let sqrt_lower = get_sqrt_ratio_at_tick(-600).unwrap();
        let sqrt_upper = get_sqrt_ratio_at_tick(600).unwrap();
        let plenty = BigUint::from(10u128.pow(30));
        let scarce = BigUint::from(1_000u32);

        let liquidity =
            max_liquidity_for_amounts(&current, &sqrt_lower, &sqrt_upper, &plenty, &scarce, true).unwrap();
        let only_token1 = max_liquidity_for_amount_1(&sqrt_lower, &current, &scarce).unwrap();
        assert_eq!(liquidity, only_token1);
    }
}
