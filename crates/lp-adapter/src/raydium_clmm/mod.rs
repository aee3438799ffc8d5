//! Raydium CLMM (concentrated liquidity) adapter.
//!
//! Program ID: `CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK`
//!
//! Tick-based concentrated liquidity with Token-2022 NFT positions. New
//! positions use `open_position_with_token22_nft`; liquidity changes use the
//! v2 instruction family, which carries both token programs and the mints.

use solana_sdk::pubkey::Pubkey;

use crate::error::Result;
use crate::pda::{derive, DerivedAddress};

pub mod adapter;
pub mod close_position;
pub mod decrease_liquidity;
pub mod increase_liquidity;
pub mod math;
pub mod open_position;
pub mod state;

/// Raydium CLMM Program ID
pub const CLMM_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK");

/// Ticks per tick-array account.
pub const TICK_ARRAY_SIZE: i32 = 60;

/// Valid tick bounds.
pub const MIN_TICK: i32 = -443_636;
pub const MAX_TICK: i32 = 443_636;

/// X64 fixed-point scale.
pub const Q64: u128 = 1u128 << 64;

/// sqrt(1.0001^MIN_TICK) in X64, the lowest representable sqrt price.
pub const MIN_SQRT_PRICE_X64: u128 = 4_295_048_016;

// PDA seed tags
pub const TICK_ARRAY_SEED: &[u8] = b"tick_array";
pub const POSITION_SEED: &[u8] = b"position";

pub use crate::anchor::{anchor_account_discriminator, anchor_discriminator};

/// Tick array PDA. The start index seed is big-endian; this is part of the
/// program's public interface and differs from the little-endian ticks in
/// the protocol-position seeds.
pub fn derive_tick_array(
    pool: &Pubkey,
    tick: i32,
    tick_spacing: u16,
) -> Result<DerivedAddress> {
    let start_index = math::tick_array_start_index(tick, tick_spacing);
    derive(
        &[TICK_ARRAY_SEED, pool.as_ref(), &start_index.to_be_bytes()],
        &CLMM_PROGRAM_ID,
        "tick_array",
    )
}

/// Protocol position PDA, keyed by pool and little-endian tick bounds.
pub fn derive_protocol_position(
    pool: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<DerivedAddress> {
    derive(
        &[
            POSITION_SEED,
            pool.as_ref(),
            &tick_lower.to_le_bytes(),
            &tick_upper.to_le_bytes(),
        ],
        &CLMM_PROGRAM_ID,
        "protocol_position",
    )
}

/// Personal position PDA, keyed by the position NFT mint.
pub fn derive_personal_position(nft_mint: &Pubkey) -> Result<DerivedAddress> {
    derive(
        &[POSITION_SEED, nft_mint.as_ref()],
        &CLMM_PROGRAM_ID,
        "personal_position",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_array_seeds_are_big_endian() {
        let pool = Pubkey::new_unique();
        let derived = derive_tick_array(&pool, -120, 10).unwrap();
        let start = math::tick_array_start_index(-120, 10);
        let manual = Pubkey::find_program_address(
            &[TICK_ARRAY_SEED, pool.as_ref(), &start.to_be_bytes()],
            &CLMM_PROGRAM_ID,
        );
        assert_eq!(derived.address, manual.0);
        assert_eq!(derived.bump, manual.1);
    }

    #[test]
    fn protocol_position_seeds_are_little_endian() {
        let pool = Pubkey::new_unique();
        let derived = derive_protocol_position(&pool, -10, 10).unwrap();
        let manual = Pubkey::find_program_address(
            &[
                POSITION_SEED,
                pool.as_ref(),
                &(-10i32).to_le_bytes(),
                &10i32.to_le_bytes(),
            ],
            &CLMM_PROGRAM_ID,
        );
        assert_eq!(derived.address, manual.0);
    }
}
