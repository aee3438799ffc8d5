//! Shared token plumbing: associated token accounts, WSOL wrapping and
//! UI-amount conversions used by both protocol adapters.

use rust_decimal::{
    prelude::{MathematicalOps, ToPrimitive},
    Decimal,
};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_instruction};

use crate::error::{Error, Result};

/// System Program ID
pub const SYSTEM_PROGRAM_ID: Pubkey = solana_sdk::pubkey!("11111111111111111111111111111111");

/// Token Program ID
pub const TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// Token-2022 Program ID
pub const TOKEN_2022_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

/// Associated Token Account Program ID
pub const ATA_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// SPL Memo Program ID
pub const MEMO_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr");

/// Rent sysvar
pub const RENT_SYSVAR_ID: Pubkey =
    solana_sdk::pubkey!("SysvarRent111111111111111111111111111111111");

/// Wrapped SOL mint
pub const WSOL_MINT: Pubkey =
    solana_sdk::pubkey!("So11111111111111111111111111111111111111112");

/// Derive the associated token account for `owner`/`mint` under the given
/// token program. Token-2022 mints get Token-2022 ATAs.
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    spl_associated_token_account::get_associated_token_address_with_program_id(
        owner,
        mint,
        token_program,
    )
}

/// Idempotent ATA creation: a no-op on-chain when the account already exists.
pub fn create_ata_idempotent_instruction(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey,
) -> Instruction {
    spl_associated_token_account::instruction::create_associated_token_account_idempotent(
        payer,
        owner,
        mint,
        token_program,
    )
}

/// Wrap `lamports` of native SOL into the owner's WSOL ATA:
/// create-ATA (idempotent), transfer, sync_native.
///
/// WSOL always lives under the legacy token program.
pub fn wrap_sol_instructions(owner: &Pubkey, lamports: u64) -> Vec<Instruction> {
    let wsol_ata = associated_token_address(owner, &WSOL_MINT, &TOKEN_PROGRAM_ID);
    vec![
        create_ata_idempotent_instruction(owner, owner, &WSOL_MINT, &TOKEN_PROGRAM_ID),
        system_instruction::transfer(owner, &wsol_ata, lamports),
        spl_token::instruction::sync_native(&spl_token::id(), &wsol_ata)
            .expect("sync_native with the token program id is infallible"),
    ]
}

/// Close the owner's WSOL ATA, returning the wrapped lamports to the owner.
pub fn unwrap_wsol_instruction(owner: &Pubkey) -> Instruction {
    let wsol_ata = associated_token_address(owner, &WSOL_MINT, &TOKEN_PROGRAM_ID);
    spl_token::instruction::close_account(&spl_token::id(), &wsol_ata, owner, owner, &[])
        .expect("close_account with the token program id is infallible")
}

/// Pick the token program for a mint from the owner of its mint account.
///
/// WSOL is pinned to the legacy token program regardless of what the
/// caller observed; unknown owners fall back to the legacy program.
pub fn token_program_for_mint(mint: &Pubkey, mint_account_owner: Option<&Pubkey>) -> Pubkey {
    if *mint == WSOL_MINT {
        return TOKEN_PROGRAM_ID;
    }
    match mint_account_owner {
        Some(owner) if *owner == TOKEN_2022_PROGRAM_ID => TOKEN_2022_PROGRAM_ID,
        _ => TOKEN_PROGRAM_ID,
    }
}

/// Convert the UI representation of a token amount (using the decimals field
/// defined in its mint) to the raw amount.
pub fn ui_amount_to_amount(ui_amount: Decimal, decimals: u8) -> Result<u64> {
    if ui_amount < Decimal::ZERO {
        return Err(Error::AmountConversion("amount is negative".to_owned()));
    }
    ui_amount
        .checked_mul(Decimal::TEN.powu(decimals as u64))
        .and_then(|d| d.floor().to_u64())
        .ok_or_else(|| Error::AmountConversion("amount overflow".to_owned()))
}

/// Convert a raw token amount back to its UI representation.
pub fn amount_to_ui_amount(amount: u64, decimals: u8) -> Decimal {
    Decimal::from(amount) / Decimal::TEN.powu(decimals as u64)
}

/// Scale a raw amount up by a slippage tolerance, rounding down.
pub fn with_slippage_up(amount: u64, slippage_bps: u16) -> u64 {
    let scaled = amount as u128 * (10_000 + slippage_bps as u128) / 10_000;
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ata_matches_manual_derivation() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let expected = Pubkey::find_program_address(
            &[owner.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
            &ATA_PROGRAM_ID,
        )
        .0;
        assert_eq!(
            associated_token_address(&owner, &mint, &TOKEN_PROGRAM_ID),
            expected
        );
    }

    #[test]
    fn wrap_sol_emits_create_transfer_sync() {
        let owner = Pubkey::new_unique();
        let ixs = wrap_sol_instructions(&owner, 1_000_000);
        assert_eq!(ixs.len(), 3);
        assert_eq!(ixs[0].program_id, ATA_PROGRAM_ID);
        assert_eq!(ixs[1].program_id, SYSTEM_PROGRAM_ID);
        assert_eq!(ixs[2].program_id, TOKEN_PROGRAM_ID);
        // sync_native is token instruction 17
        assert_eq!(ixs[2].data, vec![17]);
    }

    #[test]
    fn wsol_always_uses_legacy_token_program() {
        assert_eq!(
            token_program_for_mint(&WSOL_MINT, Some(&TOKEN_2022_PROGRAM_ID)),
            TOKEN_PROGRAM_ID
        );
        let mint = Pubkey::new_unique();
        assert_eq!(
            token_program_for_mint(&mint, Some(&TOKEN_2022_PROGRAM_ID)),
            TOKEN_2022_PROGRAM_ID
        );
        assert_eq!(token_program_for_mint(&mint, None), TOKEN_PROGRAM_ID);
    }

    #[test]
    fn ui_amount_round_trips() {
        let one_and_a_half = Decimal::new(15, 1);
        let raw = ui_amount_to_amount(one_and_a_half, 9).unwrap();
        assert_eq!(raw, 1_500_000_000);
        assert_eq!(amount_to_ui_amount(raw, 9), one_and_a_half);
        assert!(ui_amount_to_amount(Decimal::NEGATIVE_ONE, 6).is_err());
    }

    #[test]
    fn slippage_scales_up() {
        assert_eq!(with_slippage_up(10_000, 50), 10_050);
        assert_eq!(with_slippage_up(0, 50), 0);
    }
}
