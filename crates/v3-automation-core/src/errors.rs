//! # Core Error Types
//!
//! Errors raised by the position and price arithmetic. Every error is a
//! deterministic rejection of its input, so none of them is retryable.

use thiserror::Error;

/// Errors that can occur in the automation core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutomationError {
    // ========================================================================
    // Tick and Range Errors
    // ========================================================================

    #[error("Invalid tick range: tickUpper must be greater than tickLower")]
    InvalidTickRange,

    #[error("Tick {0} is outside [MIN_TICK, MAX_TICK]")]
    OutOfRangeTick(i32),

    #[error("Tick {tick} is not a multiple of tick spacing {tick_spacing}")]
    UnusableTick { tick: i32, tick_spacing: i32 },

    #[error("Sqrt ratio {0} is outside [MIN_SQRT_RATIO, MAX_SQRT_RATIO)")]
    SqrtRatioOutOfBounds(String),

    #[error("Invalid tick spacing: {0}")]
    InvalidTickSpacing(i32),

    #[error("Invalid range width: {0}")]
    InvalidWidth(i32),

    // ========================================================================
    // Price and Proportion Errors
    // ========================================================================

    #[error("Invalid token0ValueProportion: must be a value between 0 and 1, inclusive")]
    InvalidProportion,

    #[error("Invalid price string: {0}")]
    InvalidPriceFormat(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Square root of a negative number")]
    NegativeSqrt,

    #[error("Liquidity exceeds uint128")]
    LiquidityOverflow,

    // ========================================================================
    // Pool and Token Errors
    // ========================================================================

    #[error("Invalid pool state: {0}")]
    InvalidPoolState(&'static str),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Tokens must be different")]
    IdenticalTokens,

    // ========================================================================
    // Condition Errors
    // ========================================================================

    #[error("Invalid offset specification: {0}")]
    InvalidOffsetSpecification(&'static str),

    #[error("gtePriceOffset must be positive and ltePriceOffset must be negative")]
    InvalidPriceOffsetSign,

    #[error("Inconsistent threshold: {0}")]
    InconsistentThreshold(&'static str),

    #[error("At least one of gte and lte must be set")]
    MissingThreshold,

    #[error("A tick range is required for ratio-based conditions")]
    MissingTickRange,

    // ========================================================================
    // Integration Errors
    // ========================================================================

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Snapshot provider error: {0}")]
    Provider(String),
}

/// Result type using core errors
pub type CoreResult<T> = Result<T, AutomationError>;

impl AutomationError {
    /// Create an invalid price format error for the given input
    pub fn invalid_price(input: &str) -> Self {
        Self::InvalidPriceFormat(input.to_string())
    }

    /// Create a configuration error with reason
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// Create a provider error with reason
    pub fn provider(reason: impl Into<String>) -> Self {
        Self::Provider(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = AutomationError::OutOfRangeTick(887273);
        assert_eq!(format!("{}", err), "Tick 887273 is outside [MIN_TICK, MAX_TICK]");

        let err = AutomationError::invalid_price("1.2.3");
        assert_eq!(format!("{}", err), "Invalid price string: 1.2.3");

        let err = AutomationError::UnusableTick { tick: 7, tick_spacing: 60 };
        assert!(format!("{}", err).contains("spacing 60"));
    }
}
