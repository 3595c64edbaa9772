//! # Snapshot Providers
//!
//! The core never reads chain state itself. Callers plug in providers that
//! return pool and position snapshots, usually backed by node RPC or a
//! subgraph, and [`load_position`] assembles them into a [`Position`].

use std::collections::HashMap;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{AutomationError, CoreResult};
use crate::math::big_int::biguint_string;
use crate::types::pool::Pool;
use crate::types::position::Position;
use crate::types::token::{Address, Token};

/// Pool state as read from chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSnapshot {
    pub token0: Token,
    pub token1: Token,
    pub fee: u32,
    pub tick_spacing: i32,
    #[serde(with = "biguint_string")]
    pub sqrt_price_x96: BigUint,
    pub tick: i32,
    pub liquidity: u128,
}

impl PoolSnapshot {
    /// Validate the snapshot into a [`Pool`]
    pub fn into_pool(self) -> CoreResult<Pool> {
        Pool::with_tick_spacing(
            self.token0,
            self.token1,
            self.fee,
            self.tick_spacing,
            self.sqrt_price_x96,
            self.liquidity,
            self.tick,
        )
    }
}

/// Position state as read from the position manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSnapshot {
    pub token0: Token,
    pub token1: Token,
    pub fee: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
}

/// Pool lookup parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolQuery {
    pub chain_id: u64,
    pub token_a: Address,
    pub token_b: Address,
    pub fee: u32,
    /// Block to read at; `None` reads the latest block
    pub block_number: Option<u64>,
}

impl PoolQuery {
    /// Token addresses in pool order
    pub fn sorted_tokens(&self) -> (Address, Address) {
        if self.token_a <= self.token_b {
            (self.token_a, self.token_b)
        } else {
            (self.token_b, self.token_a)
        }
    }
}

/// Source of pool snapshots
#[async_trait::async_trait]
pub trait PoolSnapshotProvider: Send + Sync {
    /// Read the pool for the query's token pair and fee
    async fn pool_snapshot(&self, query: &PoolQuery) -> CoreResult<PoolSnapshot>;
}

/// Source of position snapshots
#[async_trait::async_trait]
pub trait PositionSnapshotProvider: Send + Sync {
    /// Read a position by its position manager token id
    async fn position_snapshot(&self, chain_id: u64, position_id: u64) -> CoreResult<PositionSnapshot>;
}

/// Fixed snapshots, for tests and offline analysis
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotProvider {
    pools: HashMap<(u64, Address, Address, u32), PoolSnapshot>,
    positions: HashMap<(u64, u64), PositionSnapshot>,
}

impl InMemorySnapshotProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pool snapshot, replacing any previous one for the same pool
    pub fn insert_pool(&mut self, snapshot: PoolSnapshot) {
        let (token0, token1) = if snapshot.token0.address <= snapshot.token1.address {
            (snapshot.token0.address, snapshot.token1.address)
        } else {
            (snapshot.token1.address, snapshot.token0.address)
        };
        let key = (snapshot.token0.chain_id, token0, token1, snapshot.fee);
        self.pools.insert(key, snapshot);
    }

    /// Register a position snapshot under `position_id`
    pub fn insert_position(&mut self, position_id: u64, snapshot: PositionSnapshot) {
        self.positions.insert((snapshot.token0.chain_id, position_id), snapshot);
    }

    pub fn with_pool(mut self, snapshot: PoolSnapshot) -> Self {
        self.insert_pool(snapshot);
        self
    }

    pub fn with_position(mut self, position_id: u64, snapshot: PositionSnapshot) -> Self {
        self.insert_position(position_id, snapshot);
        self
    }
}

#[async_trait::async_trait]
impl PoolSnapshotProvider for InMemorySnapshotProvider {
    async fn pool_snapshot(&self, query: &PoolQuery) -> CoreResult<PoolSnapshot> {
        let (token0, token1) = query.sorted_tokens();
        self.pools
            .get(&(query.chain_id, token0, token1, query.fee))
            .cloned()
            .ok_or_else(|| {
                AutomationError::provider(format!(
                    "no pool for {}/{} fee {} on chain {}",
                    token0, token1, query.fee, query.chain_id
                ))
            })
    }
}

#[async_trait::async_trait]
impl PositionSnapshotProvider for InMemorySnapshotProvider {
    async fn position_snapshot(&self, chain_id: u64, position_id: u64) -> CoreResult<PositionSnapshot> {
        self.positions
            .get(&(chain_id, position_id))
            .cloned()
            .ok_or_else(|| {
                AutomationError::provider(format!("no position {} on chain {}", position_id, chain_id))
            })
    }
}

/// Assemble a [`Position`] from its snapshot and its pool's snapshot
pub async fn load_position<P, Q>(
    pools: &P,
    positions: &Q,
    chain_id: u64,
    position_id: u64,
    block_number: Option<u64>,
) -> CoreResult<Position>
where
    P: PoolSnapshotProvider + ?Sized,
    Q: PositionSnapshotProvider + ?Sized,
{
    let snapshot = positions.position_snapshot(chain_id, position_id).await?;
    debug!(
        "Loading position {} on chain {}: [{}, {})",
        position_id, chain_id, snapshot.tick_lower, snapshot.tick_upper
    );

    let query = PoolQuery {
        chain_id,
        token_a: snapshot.token0.address,
        token_b: snapshot.token1.address,
        fee: snapshot.fee,
        block_number,
    };
    let pool = pools.pool_snapshot(&query).await?.into_pool()?;
    Position::new(pool, snapshot.tick_lower, snapshot.tick_upper, snapshot.liquidity)
}
