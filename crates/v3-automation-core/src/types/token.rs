//! # Token Types
//!
//! ERC-20 token metadata as resolved by the caller. Pools order their tokens by
//! address, and [`Address`] orders by its big-endian bytes, which is the
//! 160-bit integer it encodes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{AutomationError, CoreResult};

pub use alloy_primitives::Address;

/// Parse a hex address, with or without the `0x` prefix
pub fn parse_address(s: &str) -> CoreResult<Address> {
    Address::from_str(s).map_err(|_| AutomationError::InvalidAddress(s.to_string()))
}

/// Token metadata
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub chain_id: u64,
    pub address: Address,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl Token {
    /// Create a token from its address string
    pub fn new(chain_id: u64, address: &str, decimals: u8, symbol: Option<&str>) -> CoreResult<Self> {
        Ok(Self {
            chain_id,
            address: parse_address(address)?,
            decimals,
            symbol: symbol.map(str::to_string),
        })
    }

    /// Whether this token is token0 of a pool formed with `other`
    pub fn sorts_before(&self, other: &Token) -> CoreResult<bool> {
        if self.address == other.address {
            return Err(AutomationError::IdenticalTokens);
        }
        Ok(self.address < other.address)
    }
}

/// Order two tokens as (token0, token1)
pub fn sort_tokens(token_a: Token, token_b: Token) -> CoreResult<(Token, Token)> {
    if token_a.sorts_before(&token_b)? {
        Ok((token_a, token_b))
    } else {
        Ok((token_b, token_a))
    }
}
