//! `increase_liquidity_v2` — add liquidity to an existing position.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::{anchor_discriminator, CLMM_PROGRAM_ID};
use crate::error::Result;
use crate::utils::{TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};

pub const NAME: &str = "increase_liquidity_v2";

#[derive(Debug, Clone, BorshSerialize)]
pub struct IncreaseLiquidityArgs {
    pub liquidity: u128,
    pub amount_0_max: u64,
    pub amount_1_max: u64,
    pub base_flag: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct IncreaseLiquidityAccounts {
    pub nft_owner: Pubkey,
    pub nft_account: Pubkey,
    pub pool_state: Pubkey,
    pub protocol_position: Pubkey,
    pub personal_position: Pubkey,
    pub tick_array_lower: Pubkey,
    pub tick_array_upper: Pubkey,
    pub token_account_0: Pubkey,
    pub token_account_1: Pubkey,
    pub token_vault_0: Pubkey,
    pub token_vault_1: Pubkey,
    pub vault_0_mint: Pubkey,
    pub vault_1_mint: Pubkey,
}

impl IncreaseLiquidityAccounts {
    pub fn to_account_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new_readonly(self.nft_owner, true),
            AccountMeta::new_readonly(self.nft_account, false),
            AccountMeta::new(self.pool_state, false),
            AccountMeta::new(self.protocol_position, false),
            AccountMeta::new(self.personal_position, false),
            AccountMeta::new(self.tick_array_lower, false),
            AccountMeta::new(self.tick_array_upper, false),
            AccountMeta::new(self.token_account_0, false),
            AccountMeta::new(self.token_account_1, false),
            AccountMeta::new(self.token_vault_0, false),
            AccountMeta::new(self.token_vault_1, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(TOKEN_2022_PROGRAM_ID, false),
            AccountMeta::new_readonly(self.vault_0_mint, false),
            AccountMeta::new_readonly(self.vault_1_mint, false),
        ]
    }
}

pub fn build(
    accounts: &IncreaseLiquidityAccounts,
    args: &IncreaseLiquidityArgs,
) -> Result<Instruction> {
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

    #[test]
    fn owner_is_sole_signer_and_vaults_are_writable() {
        let accounts = IncreaseLiquidityAccounts {
            nft_owner: Pubkey::new_unique(),
            nft_account: Pubkey::new_unique(),
            pool_state: Pubkey::new_unique(),
            protocol_position: Pubkey::new_unique(),
            personal_position: Pubkey::new_unique(),
            tick_array_lower: Pubkey::new_unique(),
            tick_array_upper: Pubkey::new_unique(),
            token_account_0: Pubkey::new_unique(),
            token_account_1: Pubkey::new_unique(),
            token_vault_0: Pubkey::new_unique(),
            token_vault_1: Pubkey::new_unique(),
            vault_0_mint: Pubkey::new_unique(),
            vault_1_mint: Pubkey::new_unique(),
        };
        let metas = accounts.to_account_metas();
        assert_eq!(metas.len(), 15);
        assert!(metas[0].is_signer && !metas[0].is_writable);
        assert!(metas.iter().filter(|m| m.is_signer).count() == 1);
        let vault = metas
            .iter()
            .find(|m| m.pubkey == accounts.token_vault_0)
            .unwrap();
        assert!(vault.is_writable);
    }

    #[test]
    fn data_packs_liquidity_then_maxima() {
        let accounts = IncreaseLiquidityAccounts {
            nft_owner: Pubkey::new_unique(),
            nft_account: Pubkey::new_unique(),
            pool_state: Pubkey::new_unique(),
            protocol_position: Pubkey::new_unique(),
            personal_position: Pubkey::new_unique(),
            tick_array_lower: Pubkey::new_unique(),
            tick_array_upper: Pubkey::new_unique(),
            token_account_0: Pubkey::new_unique(),
            token_account_1: Pubkey::new_unique(),
            token_vault_0: Pubkey::new_unique(),
            token_vault_1: Pubkey::new_unique(),
            vault_0_mint: Pubkey::new_unique(),
            vault_1_mint: Pubkey::new_unique(),
        };
        let args = IncreaseLiquidityArgs {
            liquidity: 7,
            amount_0_max: 11,
            amount_1_max: 13,
            base_flag: None,
        };
        let ix = build(&accounts, &args).unwrap();
        assert_eq!(&ix.data[..8], &anchor_discriminator(NAME));
        assert_eq!(&ix.data[8..24], &7u128.to_le_bytes());
        assert_eq!(&ix.data[24..32], &11u64.to_le_bytes());
        assert_eq!(&ix.data[32..40], &13u64.to_le_bytes());
        assert_eq!(ix.data[40], 0);
    }
}
