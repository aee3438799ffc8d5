//! `open_position_with_token22_nft` — create a position identified by a
//! fresh Token-2022 NFT mint. The mint keypair must co-sign.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::{anchor_discriminator, CLMM_PROGRAM_ID};
use crate::error::Result;
use crate::utils::{
    ATA_PROGRAM_ID, RENT_SYSVAR_ID, SYSTEM_PROGRAM_ID, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID,
};

pub const NAME: &str = "open_position_with_token22_nft";

#[derive(Debug, Clone, BorshSerialize)]
pub struct OpenPositionArgs {
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub tick_array_lower_start_index: i32,
    pub tick_array_upper_start_index: i32,
    pub liquidity: u128,
    pub amount_0_max: u64,
    pub amount_1_max: u64,
    pub with_metadata: bool,
    /// `Some(true)` = amounts are quoted in token 0. Borsh encodes the
    /// option as the one-byte presence flag the program expects.
    pub base_flag: Option<bool>,
}

/// Account list in the order the program declares it. The struct fields are
/// the schema; `to_account_metas` cannot reorder or drop entries.
#[derive(Debug, Clone)]
pub struct OpenPositionAccounts {
    pub payer: Pubkey,
    pub position_nft_owner: Pubkey,
    pub position_nft_mint: Pubkey,
    pub position_nft_account: Pubkey,
    pub pool_state: Pubkey,
    pub protocol_position: Pubkey,
    pub tick_array_lower: Pubkey,
    pub tick_array_upper: Pubkey,
    pub personal_position: Pubkey,
    pub token_account_0: Pubkey,
    pub token_account_1: Pubkey,
    pub token_vault_0: Pubkey,
    pub token_vault_1: Pubkey,
    pub vault_0_mint: Pubkey,
    pub vault_1_mint: Pubkey,
}

impl OpenPositionAccounts {
    pub fn to_account_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.payer, true),
            AccountMeta::new_readonly(self.position_nft_owner, false),
            AccountMeta::new(self.position_nft_mint, true),
            AccountMeta::new(self.position_nft_account, false),
            AccountMeta::new(self.pool_state, false),
            AccountMeta::new(self.protocol_position, false),
            AccountMeta::new(self.tick_array_lower, false),
            AccountMeta::new(self.tick_array_upper, false),
            AccountMeta::new(self.personal_position, false),
            AccountMeta::new(self.token_account_0, false),
            AccountMeta::new(self.token_account_1, false),
            AccountMeta::new(self.token_vault_0, false),
            AccountMeta::new(self.token_vault_1, false),
            AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(ATA_PROGRAM_ID, false),
            AccountMeta::new_readonly(TOKEN_2022_PROGRAM_ID, false),
            AccountMeta::new_readonly(self.vault_0_mint, false),
            AccountMeta::new_readonly(self.vault_1_mint, false),
        ]
    }
}

pub fn build(accounts: &OpenPositionAccounts, args: &OpenPositionArgs) -> Result<Instruction> {
    let mut data = anchor_discriminator(NAME).to_vec();
    args.serialize(&mut data)?;
    Ok(Instruction {
        program_id: CLMM_PROGRAM_ID,
        accounts: accounts.to_account_metas(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> OpenPositionAccounts {
        OpenPositionAccounts {
            payer: Pubkey::new_unique(),
            position_nft_owner: Pubkey::new_unique(),
            position_nft_mint: Pubkey::new_unique(),
            position_nft_account: Pubkey::new_unique(),
            pool_state: Pubkey::new_unique(),
            protocol_position: Pubkey::new_unique(),
            tick_array_lower: Pubkey::new_unique(),
            tick_array_upper: Pubkey::new_unique(),
            personal_position: Pubkey::new_unique(),
            token_account_0: Pubkey::new_unique(),
            token_account_1: Pubkey::new_unique(),
            token_vault_0: Pubkey::new_unique(),
            token_vault_1: Pubkey::new_unique(),
            vault_0_mint: Pubkey::new_unique(),
            vault_1_mint: Pubkey::new_unique(),
        }
    }

    #[test]
    fn payer_and_nft_mint_are_the_only_signers() {
        let accounts = accounts();
        let metas = accounts.to_account_metas();
        assert_eq!(metas.len(), 20);
        let signers: Vec<&Pubkey> = metas
            .iter()
            .filter(|m| m.is_signer)
            .map(|m| &m.pubkey)
            .collect();
        assert_eq!(signers, vec![&accounts.payer, &accounts.position_nft_mint]);
    }

    #[test]
    fn argument_layout_is_packed_in_declared_order() {
        let args = OpenPositionArgs {
            tick_lower_index: -120,
            tick_upper_index: 120,
            tick_array_lower_start_index: -600,
            tick_array_upper_start_index: 0,
            liquidity: 42,
            amount_0_max: 1_000,
            amount_1_max: 2_000,
            with_metadata: true,
            base_flag: None,
        };
        let ix = build(&accounts(), &args).unwrap();
        assert_eq!(&ix.data[..8], &anchor_discriminator(NAME));
        assert_eq!(&ix.data[8..12], &(-120i32).to_le_bytes());
        assert_eq!(&ix.data[12..16], &120i32.to_le_bytes());
        assert_eq!(&ix.data[16..20], &(-600i32).to_le_bytes());
        assert_eq!(&ix.data[20..24], &0i32.to_le_bytes());
        assert_eq!(&ix.data[24..40], &42u128.to_le_bytes());
        assert_eq!(&ix.data[40..48], &1_000u64.to_le_bytes());
        assert_eq!(&ix.data[48..56], &2_000u64.to_le_bytes());
        assert_eq!(ix.data[56], 1); // with_metadata
        assert_eq!(ix.data[57], 0); // base_flag absent
        assert_eq!(ix.data.len(), 58);
    }

    #[test]
    fn present_base_flag_uses_presence_byte() {
        let mut args = OpenPositionArgs {
            tick_lower_index: 0,
            tick_upper_index: 1,
            tick_array_lower_start_index: 0,
            tick_array_upper_start_index: 0,
            liquidity: 0,
            amount_0_max: 0,
            amount_1_max: 0,
            with_metadata: false,
            base_flag: Some(true),
        };
        let ix = build(&accounts(), &args).unwrap();
        assert_eq!(&ix.data[57..59], &[1, 1]);
        args.base_flag = Some(false);
        let ix = build(&accounts(), &args).unwrap();
        assert_eq!(&ix.data[57..59], &[1, 0]);
    }
}
