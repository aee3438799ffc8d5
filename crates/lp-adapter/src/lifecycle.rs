//! Position lifecycle orchestration.
//!
//! [`PositionManager`] is the crate's front door: it resolves pools and
//! positions through the injected [`AccountReader`], dispatches on the
//! protocol tag, and returns [`InstructionPlan`]s for an external
//! signer/broadcaster. Any math or codec failure aborts an operation before
//! a single instruction is emitted — partial plans are never returned.

use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use tracing::info;

use crate::adapter::{fetch_pool, resolve_position, DecodedPool, DecodedPosition};
use crate::cache::StateCache;
use crate::config::AdapterConfig;
use crate::error::Result;
use crate::meteora_dlmm::adapter as dlmm;
use crate::range::PriceRange;
use crate::raydium_clmm::adapter as clmm;
use crate::rpc::AccountReader;
use crate::types::{InstructionPlan, PoolSnapshot, PositionSnapshot};

pub struct PositionManager<R> {
    reader: R,
    cache: StateCache,
    config: AdapterConfig,
}

impl<R: AccountReader> PositionManager<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, AdapterConfig::default())
    }

    pub fn with_config(reader: R, config: AdapterConfig) -> Self {
        Self {
            reader,
            cache: StateCache::new(),
            config,
        }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Drop all cached pool state; the next operation re-reads the ledger.
    pub fn invalidate(&mut self, pool: &Pubkey) {
        self.cache.invalidate_pool(pool);
    }

    /// Decode a pool by address, protocol detected from the owning program.
    pub async fn pool(&mut self, address: &Pubkey) -> Result<PoolSnapshot> {
        match fetch_pool(&self.reader, &mut self.cache, address, false).await? {
            DecodedPool::Clmm(pool) => clmm::pool_snapshot(address, &pool),
            DecodedPool::Dlmm(pair) => {
                dlmm::pool_snapshot(&self.reader, &mut self.cache, address, &pair).await
            }
        }
    }

    /// Open a position over `range`, depositing up to the given UI amounts.
    /// The returned plan carries the generated position keypair/NFT mint as
    /// an extra signer.
    pub async fn open(
        &mut self,
        pool: &Pubkey,
        range: &PriceRange,
        amount_a: Decimal,
        amount_b: Decimal,
        owner: &Pubkey,
        slippage_bps: Option<u16>,
    ) -> Result<InstructionPlan> {
        let plan = match fetch_pool(&self.reader, &mut self.cache, pool, false).await? {
            DecodedPool::Clmm(_) => {
                clmm::open_plan(
                    &self.reader,
                    &mut self.cache,
                    &self.config,
                    pool,
                    range,
                    amount_a,
                    amount_b,
                    owner,
                    slippage_bps,
                )
                .await?
            }
            DecodedPool::Dlmm(_) => {
                dlmm::open_plan(
                    &self.reader,
                    &mut self.cache,
                    &self.config,
                    pool,
                    range,
                    amount_a,
                    amount_b,
                    owner,
                    slippage_bps,
                )
                .await?
            }
        };
        info!(%pool, instructions = plan.instructions.len(), "open plan ready");
        Ok(plan)
    }

    /// Add liquidity to an existing position.
    pub async fn add(
        &mut self,
        position_id: &Pubkey,
        amount_a: Decimal,
        amount_b: Decimal,
        owner: &Pubkey,
        slippage_bps: Option<u16>,
    ) -> Result<InstructionPlan> {
        match resolve_position(&self.reader, position_id).await? {
            DecodedPosition::Clmm(position) => {
                clmm::add_plan(
                    &self.reader,
                    &mut self.cache,
                    &self.config,
                    &position,
                    amount_a,
                    amount_b,
                    owner,
                    slippage_bps,
                )
                .await
            }
            DecodedPosition::Dlmm { address, state } => {
                dlmm::add_plan(
                    &self.reader,
                    &mut self.cache,
                    &self.config,
                    &address,
                    &state,
                    amount_a,
                    amount_b,
                    owner,
                    slippage_bps,
                )
                .await
            }
        }
    }

    /// Remove a basis-point share of the position's liquidity
    /// (10_000 = all). Pool state is force-refreshed first so the delta
    /// never comes from a stale snapshot.
    pub async fn remove(
        &mut self,
        position_id: &Pubkey,
        bps: u16,
        owner: &Pubkey,
    ) -> Result<InstructionPlan> {
        match resolve_position(&self.reader, position_id).await? {
            DecodedPosition::Clmm(position) => {
                clmm::remove_plan(&self.reader, &mut self.cache, &position, owner, bps).await
            }
            DecodedPosition::Dlmm { address, state } => {
                dlmm::remove_plan(&self.reader, &mut self.cache, &address, &state, owner, bps)
                    .await
            }
        }
    }

    /// Claim accrued fees and rewards without moving liquidity.
    pub async fn claim(&mut self, position_id: &Pubkey, owner: &Pubkey) -> Result<InstructionPlan> {
        match resolve_position(&self.reader, position_id).await? {
            DecodedPosition::Clmm(position) => {
                clmm::claim_plan(&self.reader, &mut self.cache, &position, owner).await
            }
            DecodedPosition::Dlmm { address, state } => {
                dlmm::claim_plan(&self.reader, &mut self.cache, &address, &state, owner).await
            }
        }
    }

    /// Close a position: remove all liquidity, claim everything, then the
    /// close instruction — in that order, even when the position is already
    /// empty.
    pub async fn close(&mut self, position_id: &Pubkey, owner: &Pubkey) -> Result<InstructionPlan> {
        let plan = match resolve_position(&self.reader, position_id).await? {
            DecodedPosition::Clmm(position) => {
                clmm::close_plan(&self.reader, &mut self.cache, &self.config, &position, owner)
                    .await?
            }
            DecodedPosition::Dlmm { address, state } => {
                dlmm::close_plan(
                    &self.reader,
                    &mut self.cache,
                    &self.config,
                    &address,
                    &state,
                    owner,
                )
                .await?
            }
        };
        info!(%position_id, instructions = plan.instructions.len(), "close plan ready");
        Ok(plan)
    }

    /// All positions owned by `owner` across both protocols, optionally
    /// restricted to one pool.
    pub async fn positions(
        &mut self,
        owner: &Pubkey,
        pool: Option<&Pubkey>,
    ) -> Result<Vec<PositionSnapshot>> {
        let mut positions =
            clmm::positions_by_owner(&self.reader, &mut self.cache, owner, pool).await?;
        positions
            .extend(dlmm::positions_by_owner(&self.reader, &mut self.cache, owner, pool).await?);
        Ok(positions)
    }

    /// A single position by id (NFT mint or position account address).
    pub async fn position(&mut self, position_id: &Pubkey) -> Result<PositionSnapshot> {
        match resolve_position(&self.reader, position_id).await? {
            DecodedPosition::Clmm(position) => {
                let pool =
                    match fetch_pool(&self.reader, &mut self.cache, &position.pool_id, false)
                        .await?
                    {
                        DecodedPool::Clmm(pool) => pool,
                        DecodedPool::Dlmm(_) => {
                            return Err(crate::error::Error::UnknownProtocol(position.pool_id))
                        }
                    };
                clmm::position_snapshot(&pool, &position, None)
            }
            DecodedPosition::Dlmm { address, state } => {
                let pair = match fetch_pool(&self.reader, &mut self.cache, &state.lb_pair, false)
                    .await?
                {
                    DecodedPool::Dlmm(pair) => pair,
                    DecodedPool::Clmm(_) => {
                        return Err(crate::error::Error::UnknownProtocol(state.lb_pair))
                    }
                };
                dlmm::position_snapshot(&self.reader, &mut self.cache, &pair, &address, &state)
                    .await
            }
        }
    }

    /// Whether the pool's current unit sits inside the position's bounds.
    /// Derived from fresh state, never stored.
    pub async fn is_in_range(&mut self, position_id: &Pubkey) -> Result<bool> {
        Ok(self.position(position_id).await?.in_range)
    }
}
