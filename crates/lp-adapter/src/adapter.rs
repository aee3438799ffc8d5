//! Protocol dispatch.
//!
//! Pools and positions are tagged by the owning program and decoded into a
//! variant, so call sites branch on a tag instead of probing protocols and
//! catching failures. Adding a protocol means adding a variant here.

use solana_sdk::pubkey::Pubkey;

use crate::cache::StateCache;
use crate::error::{Error, Result};
use crate::meteora_dlmm::{self, state::LbPair, state::PositionV2};
use crate::raydium_clmm::{self, state::PersonalPosition, state::PoolState};
use crate::rpc::{mint_decimals, AccountReader, RawAccount};
use crate::types::ProtocolKind;
use crate::utils::{token_program_for_mint, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};

/// A decoded pool account, tagged by protocol.
#[derive(Debug, Clone)]
pub enum DecodedPool {
    Clmm(PoolState),
    Dlmm(LbPair),
}

impl DecodedPool {
    pub fn protocol(&self) -> ProtocolKind {
        match self {
            Self::Clmm(_) => ProtocolKind::Tick,
            Self::Dlmm(_) => ProtocolKind::Bin,
        }
    }
}

/// A decoded position, tagged by protocol.
#[derive(Debug, Clone)]
pub enum DecodedPosition {
    /// Identified by its NFT mint.
    Clmm(PersonalPosition),
    /// Identified by the position account address.
    Dlmm { address: Pubkey, state: PositionV2 },
}

impl DecodedPosition {
    pub fn protocol(&self) -> ProtocolKind {
        match self {
            Self::Clmm(_) => ProtocolKind::Tick,
            Self::Dlmm { .. } => ProtocolKind::Bin,
        }
    }

    pub fn pool(&self) -> Pubkey {
        match self {
            Self::Clmm(p) => p.pool_id,
            Self::Dlmm { state, .. } => state.lb_pair,
        }
    }
}

/// Decode a pool account by its owning program. The discriminator check
/// inside each codec still guards against a wrong account of the right
/// program.
pub fn try_decode_pool(address: &Pubkey, account: &RawAccount) -> Result<DecodedPool> {
    if account.owner == raydium_clmm::CLMM_PROGRAM_ID {
        Ok(DecodedPool::Clmm(PoolState::decode(&account.data)?))
    } else if account.owner == meteora_dlmm::DLMM_PROGRAM_ID {
        Ok(DecodedPool::Dlmm(LbPair::decode(&account.data)?))
    } else {
        Err(Error::UnknownProtocol(*address))
    }
}

/// Resolve a position id to its decoded record. The id is either a DLMM
/// position account, a CLMM personal-position PDA, or a CLMM position NFT
/// mint (owned by a token program).
pub async fn resolve_position<R: AccountReader>(
    reader: &R,
    id: &Pubkey,
) -> Result<DecodedPosition> {
    let account = reader
        .read_account(id)
        .await?
        .ok_or(Error::PositionNotFound(*id))?;

    if account.owner == meteora_dlmm::DLMM_PROGRAM_ID {
        return Ok(DecodedPosition::Dlmm {
            address: *id,
            state: PositionV2::decode(&account.data)?,
        });
    }
    if account.owner == raydium_clmm::CLMM_PROGRAM_ID {
        return Ok(DecodedPosition::Clmm(PersonalPosition::decode(
            &account.data,
        )?));
    }
    if account.owner == TOKEN_PROGRAM_ID || account.owner == TOKEN_2022_PROGRAM_ID {
        // a position NFT mint: hop to the personal position PDA
        let personal = raydium_clmm::derive_personal_position(id)?;
        let account = reader
            .read_account(&personal.address)
            .await?
            .ok_or(Error::PositionNotFound(*id))?;
        return Ok(DecodedPosition::Clmm(PersonalPosition::decode(
            &account.data,
        )?));
    }
    Err(Error::UnknownProtocol(*id))
}

/// Decimals and owning token program of a mint, cached per adapter
/// instance: both are immutable once the mint exists.
pub async fn mint_info<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    mint: &Pubkey,
) -> Result<(u8, Pubkey)> {
    if let (Some(decimals), Some(program)) = (cache.decimals(mint), cache.token_program(mint)) {
        return Ok((decimals, program));
    }
    let account = reader
        .read_account(mint)
        .await?
        .ok_or(Error::AccountNotFound(*mint))?;
    let decimals = mint_decimals(&account.data).ok_or(Error::Decode(
        crate::error::DecodeError::TooShort {
            need: 45,
            got: account.data.len(),
        },
    ))?;
    let program = token_program_for_mint(mint, Some(&account.owner));
    cache.store_decimals(*mint, decimals);
    cache.store_token_program(*mint, program);
    Ok((decimals, program))
}

/// Fetch-and-decode a pool with caching. `refresh` forces a ledger read;
/// remove/claim/close paths must pass `true` so liquidity deltas never come
/// from stale state.
pub async fn fetch_pool<R: AccountReader>(
    reader: &R,
    cache: &mut StateCache,
    address: &Pubkey,
    refresh: bool,
) -> Result<DecodedPool> {
    if !refresh {
        if let Some(pool) = cache.pool(address) {
            return Ok(pool.clone());
        }
    } else {
        cache.invalidate_pool(address);
    }
    let account = reader
        .read_account(address)
        .await?
        .ok_or(Error::AccountNotFound(*address))?;
    let pool = try_decode_pool(address, &account)?;
    cache.store_pool(*address, pool.clone());
    Ok(pool)
}
