//! Property-based tests for tick, price, proportion and limit order invariants

use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use proptest::prelude::*;
use v3_automation_core::math::*;
use v3_automation_core::*;

fn token0() -> Token {
    Token::new(1, "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599", 8, Some("WBTC")).unwrap()
}

fn token1() -> Token {
    Token::new(1, "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", 18, Some("WETH")).unwrap()
}

prop_compose! {
    fn tick_range_strategy()(
        lower in -400_000i32..400_000i32,
        width in 10i32..200_000i32
    ) -> (i32, i32) {
        (lower, lower + width)
    }
}

prop_compose! {
    fn proportion_strategy()(
        hundredths in 1u32..100u32
    ) -> BigDecimal {
        BigDecimal::from(hundredths) / BigDecimal::from(100)
    }
}

prop_compose! {
    fn tick_spacing_strategy()(
        index in 0usize..4
    ) -> i32 {
        [1, 10, 60, 200][index]
    }
}

proptest! {
    #[test]
    fn prop_tick_sqrt_ratio_round_trip(tick in MIN_TICK..=MAX_TICK) {
        let sqrt_ratio = get_sqrt_ratio_at_tick(tick).unwrap();
        if tick < MAX_TICK {
            prop_assert_eq!(get_tick_at_sqrt_ratio(&sqrt_ratio).unwrap(), tick);
        }
        prop_assert!(sqrt_ratio >= *MIN_SQRT_RATIO && sqrt_ratio <= *MAX_SQRT_RATIO);
    }

    #[test]
    fn prop_tick_price_round_trip(tick in MIN_TICK..MAX_TICK) {
        let forward = tick_to_price(&token0(), &token1(), tick).unwrap();
        let inverse = tick_to_price(&token1(), &token0(), tick).unwrap();
        prop_assert_eq!(price_to_closest_tick_safe(&forward).unwrap(), tick);
        prop_assert_eq!(price_to_closest_tick_safe(&inverse).unwrap(), tick);
    }

    #[test]
    fn prop_closest_tick_ignores_orientation(numerator in 1u64..u64::MAX, denominator in 1u64..u64::MAX) {
        let price = Price::from_ratio(
            token0(),
            token1(),
            BigInt::from(numerator),
            BigInt::from(denominator),
        )
        .unwrap();
        let tick = price_to_closest_tick_safe(&price).unwrap();
        prop_assert_eq!(price_to_closest_tick_safe(&price.invert().unwrap()).unwrap(), tick);

        // The tick price is at or below the price, the next one above it
        let at_tick = tick_to_price(&token0(), &token1(), tick).unwrap();
        prop_assert!(at_tick.cmp_raw(&price) != std::cmp::Ordering::Greater);
        if tick < MAX_TICK {
            let next = tick_to_price(&token0(), &token1(), tick + 1).unwrap();
            prop_assert!(next.cmp_raw(&price) == std::cmp::Ordering::Greater);
        }
    }

    #[test]
    fn prop_proportion_round_trip((lower, upper) in tick_range_strategy(), proportion in proportion_strategy()) {
        let ctx = DecimalContext::default();
        let price = price_ratio_from_token0_proportion(lower, upper, &proportion, &ctx).unwrap();
        prop_assert!(price >= tick_to_big_price(lower, &ctx).unwrap());
        prop_assert!(price <= tick_to_big_price(upper, &ctx).unwrap());

        let recovered = token0_proportion_from_price_ratio(lower, upper, &price, &ctx).unwrap();
        let diff = (&recovered - &proportion).abs();
        let tolerance = &proportion * BigDecimal::from_str("1e-18").unwrap();
        prop_assert!(diff < tolerance, "{} vs {}", recovered, proportion);
    }

    #[test]
    fn prop_proportion_decreases_with_price((lower, upper) in tick_range_strategy()) {
        let ctx = DecimalContext::default();
        let low = BigDecimal::from_str("0.25").unwrap();
        let high = BigDecimal::from_str("0.75").unwrap();
        let price_low_share = price_ratio_from_token0_proportion(lower, upper, &low, &ctx).unwrap();
        let price_high_share = price_ratio_from_token0_proportion(lower, upper, &high, &ctx).unwrap();
        prop_assert!(price_low_share > price_high_share);
    }

    #[test]
    fn prop_limit_order_range_shape(
        tick in -800_000i32..800_000i32,
        tick_spacing in tick_spacing_strategy(),
        width_multiplier in 1u32..=10u32
    ) {
        let range = limit_order_range(tick, tick_spacing, width_multiplier).unwrap();
        let width = tick_spacing * width_multiplier as i32;

        prop_assert_eq!(range.tick_upper - range.tick_lower, width);
        prop_assert_eq!(range.tick_lower % tick_spacing, 0);
        prop_assert_eq!(range.tick_avg, (range.tick_lower + range.tick_upper).div_euclid(2));
        // Midpoint within half a spacing of the target
        prop_assert!((range.tick_lower + range.tick_upper - 2 * tick).abs() <= tick_spacing);
    }
}
