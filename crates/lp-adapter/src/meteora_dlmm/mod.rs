//! Meteora DLMM (dynamic liquidity market maker) adapter.
//!
//! Program ID: `LBUZKhRxPF3XUpBCjp4YzTKgLccjZhTSDM9YuVaPwxo`
//!
//! Bin-based liquidity with keypair-funded position accounts. The v1
//! instruction family is the default; the `*2` encodings (separate token
//! programs, memo, transfer-hook slices) are selected when either pool mint
//! is owned by Token-2022 — a pure selection, never a fallback.

use borsh::BorshSerialize;
use solana_sdk::pubkey::Pubkey;

use crate::error::Result;
use crate::pda::{derive, DerivedAddress};

pub use crate::anchor::{anchor_account_discriminator, anchor_discriminator};

pub mod adapter;
pub mod add_liquidity;
pub mod claim_fee;
pub mod claim_reward;
pub mod close_position;
pub mod initialize_bin_array;
pub mod initialize_bitmap_extension;
pub mod initialize_position;
pub mod math;
pub mod remove_liquidity;
pub mod state;

/// Meteora DLMM Program ID
pub const DLMM_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("LBUZKhRxPF3XUpBCjp4YzTKgLccjZhTSDM9YuVaPwxo");

/// Bins per bin-array account.
pub const BINS_PER_ARRAY: i32 = 70;

/// Widest position the record layout supports.
pub const MAX_POSITION_WIDTH: i32 = 70;

/// Valid bin id bounds.
pub const MIN_BIN_ID: i32 = -443_636;
pub const MAX_BIN_ID: i32 = 443_636;

// PDA seed tags
pub const BIN_ARRAY_SEED: &[u8] = b"bin_array";
pub const BITMAP_SEED: &[u8] = b"bitmap";
pub const EVENT_AUTHORITY_SEED: &[u8] = b"__event_authority";

/// Liquidity distribution shapes understood by `add_liquidity_by_strategy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize)]
pub enum StrategyType {
    SpotOneSide,
    CurveOneSide,
    BidAskOneSide,
    SpotBalanced,
    CurveBalanced,
    BidAskBalanced,
    SpotImBalanced,
    CurveImBalanced,
    BidAskImBalanced,
}

#[derive(Debug, Clone, BorshSerialize)]
pub struct StrategyParameters {
    pub min_bin_id: i32,
    pub max_bin_id: i32,
    pub strategy_type: StrategyType,
    /// Strategy-specific payload; the typo is in the program's IDL.
    pub parameteres: [u8; 64],
}

impl StrategyParameters {
    pub fn spot_balanced(min_bin_id: i32, max_bin_id: i32) -> Self {
        Self {
            min_bin_id,
            max_bin_id,
            strategy_type: StrategyType::SpotBalanced,
            parameteres: [0u8; 64],
        }
    }
}

#[derive(Debug, Clone, BorshSerialize)]
pub struct LiquidityParameterByStrategy {
    pub amount_x: u64,
    pub amount_y: u64,
    pub active_id: i32,
    pub max_active_bin_slippage: i32,
    pub strategy_parameters: StrategyParameters,
}

/// Slice descriptor for accounts trailing a `*2` instruction.
#[derive(Debug, Clone, BorshSerialize)]
pub enum AccountsType {
    TransferHookX,
    TransferHookY,
    TransferHookReward,
    TransferHookMultiReward(u8),
}

#[derive(Debug, Clone, BorshSerialize)]
pub struct RemainingAccountsSlice {
    pub accounts_type: AccountsType,
    pub length: u8,
}

#[derive(Debug, Clone, BorshSerialize)]
pub struct RemainingAccountsInfo {
    pub slices: Vec<RemainingAccountsSlice>,
}

impl RemainingAccountsInfo {
    pub fn none() -> Self {
        Self { slices: vec![] }
    }

    /// Declares zero-length transfer-hook slices for both mints; the bin
    /// arrays that follow are not part of any slice.
    pub fn empty_hooks() -> Self {
        Self {
            slices: vec![
                RemainingAccountsSlice {
                    accounts_type: AccountsType::TransferHookX,
                    length: 0,
                },
                RemainingAccountsSlice {
                    accounts_type: AccountsType::TransferHookY,
                    length: 0,
                },
            ],
        }
    }
}

/// Event authority PDA for Anchor event CPI.
pub fn derive_event_authority() -> Result<DerivedAddress> {
    derive(&[EVENT_AUTHORITY_SEED], &DLMM_PROGRAM_ID, "event_authority")
}

/// Bin array PDA, keyed by the pair and the little-endian i64 array index.
pub fn derive_bin_array(lb_pair: &Pubkey, index: i64) -> Result<DerivedAddress> {
    derive(
        &[BIN_ARRAY_SEED, lb_pair.as_ref(), &index.to_le_bytes()],
        &DLMM_PROGRAM_ID,
        "bin_array",
    )
}

/// Bin array bitmap extension PDA.
pub fn derive_bitmap_extension(lb_pair: &Pubkey) -> Result<DerivedAddress> {
    derive(
        &[BITMAP_SEED, lb_pair.as_ref()],
        &DLMM_PROGRAM_ID,
        "bitmap_extension",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_array_seed_uses_little_endian_index() {
        let lb_pair = Pubkey::new_unique();
        let derived = derive_bin_array(&lb_pair, -2).unwrap();
        let manual = Pubkey::find_program_address(
            &[BIN_ARRAY_SEED, lb_pair.as_ref(), &(-2i64).to_le_bytes()],
            &DLMM_PROGRAM_ID,
        );
        assert_eq!(derived.address, manual.0);
        assert_eq!(derived.bump, manual.1);
    }

    #[test]
    fn strategy_parameters_serialize_to_73_bytes() {
        let params = StrategyParameters::spot_balanced(-10, 10);
        let bytes = borsh::to_vec(&params).unwrap();
        // i32 + i32 + u8 tag + [u8; 64]
        assert_eq!(bytes.len(), 73);
        assert_eq!(bytes[8], StrategyType::SpotBalanced as u8);
    }

    #[test]
    fn empty_hook_slices_serialize_compactly() {
        let info = RemainingAccountsInfo::empty_hooks();
        let bytes = borsh::to_vec(&info).unwrap();
        // vec len u32 + 2 x (enum tag u8 + length u8)
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &2u32.to_le_bytes());
    }
}
