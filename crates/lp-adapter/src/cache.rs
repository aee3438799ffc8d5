//! Per-adapter snapshot cache.
//!
//! Pool state and mint decimals may be reused across plan builds, but a
//! remove/claim/close must recompute its liquidity delta from fresh state,
//! so those paths call [`StateCache::invalidate_pool`] first. The cache is
//! owned by the adapter instance; there is no ambient global state.

use std::collections::HashMap;

use solana_sdk::pubkey::Pubkey;

use crate::adapter::DecodedPool;

#[derive(Debug, Default)]
pub struct StateCache {
    pools: HashMap<Pubkey, DecodedPool>,
    decimals: HashMap<Pubkey, u8>,
    token_programs: HashMap<Pubkey, Pubkey>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(&self, address: &Pubkey) -> Option<&DecodedPool> {
        self.pools.get(address)
    }

    pub fn store_pool(&mut self, address: Pubkey, pool: DecodedPool) {
        self.pools.insert(address, pool);
    }

    /// Drop the cached state for one pool, forcing the next read to hit the
    /// ledger. Decimals and token-program owners are immutable per mint and
    /// survive invalidation.
    pub fn invalidate_pool(&mut self, address: &Pubkey) {
        self.pools.remove(address);
    }

    pub fn clear(&mut self) {
        self.pools.clear();
    }

    pub fn decimals(&self, mint: &Pubkey) -> Option<u8> {
        self.decimals.get(mint).copied()
    }

    pub fn store_decimals(&mut self, mint: Pubkey, decimals: u8) {
        self.decimals.insert(mint, decimals);
    }

    pub fn token_program(&self, mint: &Pubkey) -> Option<Pubkey> {
        self.token_programs.get(mint).copied()
    }

    pub fn store_token_program(&mut self, mint: Pubkey, program: Pubkey) {
        self.token_programs.insert(mint, program);
    }
}
