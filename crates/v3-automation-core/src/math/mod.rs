//! # Mathematical Functions
//!
//! Exact integer math for ticks, sqrt ratios and liquidity, plus the
//! arbitrary-precision decimal layer used for human prices and proportions.

pub mod big_int;
pub mod decimal;
pub mod liquidity_math;
pub mod price_math;
pub mod proportion;
pub mod tick_math;

// Re-export commonly used functions
pub use big_int::*;
pub use decimal::*;
pub use liquidity_math::*;
pub use price_math::*;
pub use proportion::*;
pub use tick_math::*;
