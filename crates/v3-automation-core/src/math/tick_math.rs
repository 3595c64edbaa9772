//! # Tick Math
//!
//! Conversions between ticks and Q64.96 sqrt ratios. `get_sqrt_ratio_at_tick`
//! reproduces the on-chain TickMath algorithm bit for bit; the inverse
//! searches that function so both directions agree exactly.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;
use once_cell::sync::Lazy;

use crate::constants::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};
use crate::errors::{AutomationError, CoreResult};

/// Magic sqrt(1.0001) powers for Q128 tick math
/// These are pre-computed values of 1 / sqrt(1.0001)^(2^i) in Q128 format
const MAGIC_SQRT_1_0001_POW_2: [u128; 20] = [
    0xfffcb933bd6fad37aa2d162d1a594001, // 2^0
    0xfff97272373d413259a46990580e213a, // 2^1
    0xfff2e50f5f656932ef12357cf3c7fdcc, // 2^2
    0xffe5caca7e10e4e61c3624eaa0941cd0, // 2^3
    0xffcb9843d60f6159c9db58835c926644, // 2^4
    0xff973b41fa98c081472e6896dfb254c0, // 2^5
    0xff2ea16466c96a3843ec78b326b52861, // 2^6
    0xfe5dee046a99a2a811c461f1969c3053, // 2^7
    0xfcbe86c7900a88aedcffc83b479aa3a4, // 2^8
    0xf987a7253ac413176f2b074cf7815e54, // 2^9
    0xf3392b0822b70005940c7a398e4b70f3, // 2^10
    0xe7159475a2c29b7443b29c7fa6e889d9, // 2^11
    0xd097f3bdfd2022b8845ad8f792aa5825, // 2^12
    0xa9f746462d870fdf8a65dc1f90e061e5, // 2^13
    0x70d869a156d2a1b890bb3df62baf32f7, // 2^14
    0x31be135f97d08fd981231505542fcfa6, // 2^15
    0x9aa508b5b7a84e1c677de54f3e99bc9,  // 2^16
    0x5d6af8dedb81196699c329225ee604,   // 2^17
    0x2216e584f5fa1ea926041bedfe98,     // 2^18
    0x48a170391f7dc42444e8fa2,          // 2^19
];

/// uint256 max, the numerator used to invert ratios for positive ticks
static U256_MAX: Lazy<BigUint> = Lazy::new(|| (BigUint::from(1u8) << 256) - 1u8);

/// 2^32, the divisor taking a Q128 ratio down to Q96
static Q32: Lazy<BigUint> = Lazy::new(|| BigUint::from(1u8) << 32);

/// Get sqrt ratio from tick as a Q64.96 value
pub fn get_sqrt_ratio_at_tick(tick: i32) -> CoreResult<BigUint> {
    if !is_tick_valid(tick) {
        return Err(AutomationError::OutOfRangeTick(tick));
    }

    let abs_tick = tick.unsigned_abs();
    let mut ratio = if abs_tick & 1 != 0 {
        BigUint::from(MAGIC_SQRT_1_0001_POW_2[0])
    } else {
        BigUint::from(1u8) << 128
    };

    // Binary decomposition of tick value using magic constants
    for (i, magic) in MAGIC_SQRT_1_0001_POW_2.iter().enumerate().skip(1) {
        if abs_tick & (1 << i) != 0 {
            ratio = (ratio * *magic) >> 128;
        }
    }

    // If tick is positive, invert the result
    if tick > 0 {
        ratio = &*U256_MAX / ratio;
    }

    // Q128.128 to Q64.96, rounding up so the result is never below the true ratio
    let (quotient, remainder) = ratio.div_rem(&Q32);
    Ok(if remainder.is_zero() {
        quotient
    } else {
        quotient + 1u8
    })
}

/// Get the greatest tick whose sqrt ratio is less than or equal to `sqrt_ratio_x96`
pub fn get_tick_at_sqrt_ratio(sqrt_ratio_x96: &BigUint) -> CoreResult<i32> {
    if !is_sqrt_ratio_valid(sqrt_ratio_x96) {
        return Err(AutomationError::SqrtRatioOutOfBounds(sqrt_ratio_x96.to_string()));
    }

    // Invariant: ratio(low) <= sqrt_ratio_x96 < ratio(high)
    let mut low = MIN_TICK;
    let mut high = MAX_TICK;

    while high - low > 1 {
        let mid = low + (high - low) / 2;
        if get_sqrt_ratio_at_tick(mid)? <= *sqrt_ratio_x96 {
            low = mid;
        } else {
            high = mid;
        }
    }

    Ok(low)
}

/// Check if a tick is within the supported range
pub fn is_tick_valid(tick: i32) -> bool {
    (MIN_TICK..=MAX_TICK).contains(&tick)
}

/// Check if a Q96 sqrt ratio is within [MIN_SQRT_RATIO, MAX_SQRT_RATIO)
pub fn is_sqrt_ratio_valid(sqrt_ratio_x96: &BigUint) -> bool {
    *sqrt_ratio_x96 >= *MIN_SQRT_RATIO && *sqrt_ratio_x96 < *MAX_SQRT_RATIO
}

/// Reject non-positive tick spacings
pub fn check_tick_spacing(tick_spacing: i32) -> CoreResult<()> {
    if tick_spacing <= 0 {
        return Err(AutomationError::InvalidTickSpacing(tick_spacing));
    }
    Ok(())
}

/// Smallest usable tick for the spacing
pub fn min_usable_tick(tick_spacing: i32) -> i32 {
    -(MAX_TICK / tick_spacing) * tick_spacing
}

/// Largest usable tick for the spacing
pub fn max_usable_tick(tick_spacing: i32) -> i32 {
    (MAX_TICK / tick_spacing) * tick_spacing
}

/// Round a tick to the nearest multiple of `tick_spacing`, ties rounding up,
/// then pull the result back inside the usable bounds
pub fn nearest_usable_tick(tick: i32, tick_spacing: i32) -> CoreResult<i32> {
    check_tick_spacing(tick_spacing)?;
    if !is_tick_valid(tick) {
        return Err(AutomationError::OutOfRangeTick(tick));
    }

    let tick = tick as i64;
    let spacing = tick_spacing as i64;
    let rounded = (2 * tick + spacing).div_euclid(2 * spacing) * spacing;

    let rounded = if rounded < MIN_TICK as i64 {
        rounded + spacing
    } else if rounded > MAX_TICK as i64 {
        rounded - spacing
    } else {
        rounded
    };
    Ok(rounded as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q96;

    #[test]
    fn test_tick_to_sqrt_ratio_conversion() {
        // At tick 0, sqrt ratio should be exactly Q96
        assert_eq!(get_sqrt_ratio_at_tick(0).unwrap(), *Q96);

        // Test bounds
        assert_eq!(get_sqrt_ratio_at_tick(MIN_TICK).unwrap(), *MIN_SQRT_RATIO);
        assert_eq!(get_sqrt_ratio_at_tick(MAX_TICK).unwrap(), *MAX_SQRT_RATIO);

        assert_eq!(
            get_sqrt_ratio_at_tick(MIN_TICK - 1),
            Err(AutomationError::OutOfRangeTick(MIN_TICK - 1))
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(MAX_TICK + 1),
            Err(AutomationError::OutOfRangeTick(MAX_TICK + 1))
        );
    }

    #[test]
    fn test_known_sqrt_ratios() {
        // Reference values from the on-chain TickMath library
        assert_eq!(
            get_sqrt_ratio_at_tick(MIN_TICK + 1).unwrap().to_string(),
            "4295343490"
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(MAX_TICK - 1).unwrap().to_string(),
            "1461373636630004318706518188784493106690254656249"
        );
    }

    #[test]
    fn test_sqrt_ratio_to_tick_conversion() {
        for tick in &[MIN_TICK, -100_000, -1000, -1, 0, 1, 1000, 100_000, MAX_TICK - 1] {
            let sqrt_ratio = get_sqrt_ratio_at_tick(*tick).unwrap();
            assert_eq!(get_tick_at_sqrt_ratio(&sqrt_ratio).unwrap(), *tick);
        }
    }

    #[test]
    fn test_sqrt_ratio_floor_semantics() {
        let at_100 = get_sqrt_ratio_at_tick(100).unwrap();
        let at_101 = get_sqrt_ratio_at_tick(101).unwrap();
        assert_eq!(get_tick_at_sqrt_ratio(&(&at_100 + 1u8)).unwrap(), 100);
        assert_eq!(get_tick_at_sqrt_ratio(&(at_101 - 1u8)).unwrap(), 100);

        let max_minus_one = &*MAX_SQRT_RATIO - 1u8;
        assert_eq!(get_tick_at_sqrt_ratio(&max_minus_one).unwrap(), MAX_TICK - 1);
        assert!(get_tick_at_sqrt_ratio(&MAX_SQRT_RATIO).is_err());
        assert!(get_tick_at_sqrt_ratio(&(&*MIN_SQRT_RATIO - 1u8)).is_err());
    }

    #[test]
    fn test_nearest_usable_tick() {
        assert_eq!(nearest_usable_tick(5, 10).unwrap(), 10);
        assert_eq!(nearest_usable_tick(4, 10).unwrap(), 0);
        assert_eq!(nearest_usable_tick(-5, 10).unwrap(), 0);
        assert_eq!(nearest_usable_tick(-6, 10).unwrap(), -10);
        assert_eq!(nearest_usable_tick(MIN_TICK, 60).unwrap(), -887_220);
        assert_eq!(nearest_usable_tick(MAX_TICK, 60).unwrap(), 887_220);
        assert_eq!(nearest_usable_tick(MAX_TICK, 200).unwrap(), 887_200);
        assert!(nearest_usable_tick(0, 0).is_err());
    }

    #[test]
    fn test_usable_bounds() {
        assert_eq!(min_usable_tick(60), -887_220);
        assert_eq!(max_usable_tick(60), 887_220);
        assert_eq!(max_usable_tick(1), MAX_TICK);
    }
}
