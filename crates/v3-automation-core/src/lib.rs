//! # V3 Automation Core - Position and Price Arithmetic
//!
//! This crate contains the arithmetic an automation client needs to manage
//! concentrated liquidity positions. It provides:
//!
//! - Tick, sqrt ratio and liquidity math with exact integer semantics
//! - Conversions between ticks, rational prices and human decimal prices
//! - Token0 value proportions of a range and their inverse
//! - Rebalance and price-move projections of a position
//! - Trigger condition shapes and translation of recurring conditions
//! - Limit order range selection
//!
//! Chain access is left to callers through the [`provider`] traits.

pub mod config;
pub mod constants;
pub mod errors;
pub mod limit_order;
pub mod math;
pub mod projection;
pub mod provider;
pub mod recurring;
pub mod types;

// Re-export commonly used items
pub use config::CoreConfig;
pub use constants::*;
pub use errors::{AutomationError, CoreResult};
pub use limit_order::{limit_order_range, limit_order_range_for_price, LimitOrderRange};
pub use math::decimal::{DecimalContext, RoundingMode};
pub use projection::{position_at_price, projected_rebalance_at_price, rebalanced_position};
pub use provider::{load_position, PoolSnapshotProvider, PositionSnapshotProvider};
pub use recurring::translate_recurring;
pub use types::*;
