//! # Core Type Definitions
//!
//! Tokens, prices, pools and positions, plus the condition and action
//! shapes exchanged with automation backends.

pub mod action;
pub mod condition;
pub mod pool;
pub mod position;
pub mod price;
pub mod token;

// Re-export all types
pub use action::*;
pub use condition::*;
pub use pool::*;
pub use position::*;
pub use price::*;
pub use token::*;
