//! # Protocol Constants
//!
//! Fundamental constants of the Uniswap V3 tick space including:
//! - Fixed-point scale factors (Q96, Q192)
//! - Tick bounds and the matching sqrt ratio bounds
//! - Standard fee tiers and their tick spacings
//! - Decimal precision defaults

use num_bigint::BigUint;
use once_cell::sync::Lazy;

// ============================================================================
// Fixed-Point Constants
// ============================================================================

/// Q96 fixed-point scale factor: 2^96
pub static Q96: Lazy<BigUint> = Lazy::new(|| BigUint::from(1u8) << 96);

/// Q192 fixed-point scale factor: 2^192, the scale of a squared Q96 value
pub static Q192: Lazy<BigUint> = Lazy::new(|| BigUint::from(1u8) << 192);

// ============================================================================
// Tick Space Constants
// ============================================================================

/// Minimum tick, log base sqrt(1.0001) of 2^-128
pub const MIN_TICK: i32 = -887_272;

/// Maximum tick, log base sqrt(1.0001) of 2^128
pub const MAX_TICK: i32 = -MIN_TICK;

/// Sqrt ratio at MIN_TICK
pub static MIN_SQRT_RATIO: Lazy<BigUint> = Lazy::new(|| BigUint::from(4_295_128_739u64));

/// Sqrt ratio at MAX_TICK
pub static MAX_SQRT_RATIO: Lazy<BigUint> = Lazy::new(|| {
    BigUint::parse_bytes(b"1461446703485210103287273052203988822378723970342", 10)
        .unwrap_or_default()
});

// ============================================================================
// Fee Tier Constants
// ============================================================================

/// Fee in hundredths of a bip for the 0.01% tier
pub const FEE_LOWEST: u32 = 100;

/// Fee for the 0.05% tier
pub const FEE_LOW: u32 = 500;

/// Fee for the 0.3% tier
pub const FEE_MEDIUM: u32 = 3_000;

/// Fee for the 1% tier
pub const FEE_HIGH: u32 = 10_000;

// ============================================================================
// Decimal Precision Constants
// ============================================================================

/// Default number of significant digits carried by decimal math
pub const DEFAULT_DECIMAL_PRECISION: u64 = 60;

/// Lowest precision accepted for decimal math
pub const MIN_DECIMAL_PRECISION: u64 = 30;

/// Default width multiplier for limit-order ranges
pub const DEFAULT_LIMIT_ORDER_WIDTH_MULTIPLIER: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqrt_ratio_bounds_parse() {
        assert_eq!(MIN_SQRT_RATIO.to_string(), "4295128739");
        assert_eq!(
            MAX_SQRT_RATIO.to_string(),
            "1461446703485210103287273052203988822378723970342"
        );
        assert_eq!(&*Q192, &(&*Q96 * &*Q96));
    }
}
