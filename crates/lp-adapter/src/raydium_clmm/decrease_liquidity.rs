//! `decrease_liquidity_v2` — remove liquidity and settle fees/rewards.
//!
//! A zero liquidity delta is the protocol's claim operation: it settles
//! accrued fees and rewards without moving liquidity. Reward vault/ATA/mint
//! triplets for every live reward slot are appended after the fixed list.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::{anchor_discriminator, CLMM_PROGRAM_ID};
use crate::error::Result;
use crate::utils::{MEMO_PROGRAM_ID, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID};

pub const NAME: &str = "decrease_liquidity_v2";

#[derive(Debug, Clone, BorshSerialize)]
pub struct DecreaseLiquidityArgs {
    pub liquidity: u128,
    pub amount_0_min: u64,
    pub amount_1_min: u64,
}

/// vault / recipient ATA / mint triplet for one live reward slot.
#[derive(Debug, Clone)]
pub struct RewardAccounts {
    pub reward_vault: Pubkey,
    pub recipient_token_account: Pubkey,
    pub reward_mint: Pubkey,
}

#[derive(Debug, Clone)]
pub struct DecreaseLiquidityAccounts {
    pub nft_owner: Pubkey,
    pub nft_account: Pubkey,
    pub personal_position: Pubkey,
    pub pool_state: Pubkey,
    pub protocol_position: Pubkey,
    pub token_vault_0: Pubkey,
    pub token_vault_1: Pubkey,
    pub tick_array_lower: Pubkey,
    pub tick_array_upper: Pubkey,
    pub recipient_token_account_0: Pubkey,
    pub recipient_token_account_1: Pubkey,
    pub vault_0_mint: Pubkey,
    pub vault_1_mint: Pubkey,
    pub rewards: Vec<RewardAccounts>,
}

impl DecreaseLiquidityAccounts {
    pub fn to_account_metas(&self) -> Vec<AccountMeta> {
        let mut metas = vec![
            AccountMeta::new(self.nft_owner, true),
            AccountMeta::new(self.nft_account, false),
            AccountMeta::new(self.personal_position, false),
            AccountMeta::new(self.pool_state, false),
            AccountMeta::new_readonly(self.protocol_position, false),
            AccountMeta::new(self.token_vault_0, false),
            AccountMeta::new(self.token_vault_1, false),
            AccountMeta::new(self.tick_array_lower, false),
            AccountMeta::new(self.tick_array_upper, false),
            AccountMeta::new(self.recipient_token_account_0, false),
            AccountMeta::new(self.recipient_token_account_1, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(TOKEN_2022_PROGRAM_ID, false),
            AccountMeta::new_readonly(MEMO_PROGRAM_ID, false),
            AccountMeta::new_readonly(self.vault_0_mint, false),
            AccountMeta::new_readonly(self.vault_1_mint, false),
        ];
        for reward in &self.rewards {
            metas.push(AccountMeta::new(reward.reward_vault, false));
            metas.push(AccountMeta::new(reward.recipient_token_account, false));
            metas.push(AccountMeta::new_readonly(reward.reward_mint, false));
        }
        metas
    }
}

pub fn build(
    accounts: &DecreaseLiquidityAccounts,
    args: &DecreaseLiquidityArgs,
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

    fn accounts(rewards: Vec<RewardAccounts>) -> DecreaseLiquidityAccounts {
        DecreaseLiquidityAccounts {
            nft_owner: Pubkey::new_unique(),
            nft_account: Pubkey::new_unique(),
            personal_position: Pubkey::new_unique(),
            pool_state: Pubkey::new_unique(),
            protocol_position: Pubkey::new_unique(),
            token_vault_0: Pubkey::new_unique(),
            token_vault_1: Pubkey::new_unique(),
            tick_array_lower: Pubkey::new_unique(),
            tick_array_upper: Pubkey::new_unique(),
            recipient_token_account_0: Pubkey::new_unique(),
            recipient_token_account_1: Pubkey::new_unique(),
            vault_0_mint: Pubkey::new_unique(),
            vault_1_mint: Pubkey::new_unique(),
            rewards,
        }
    }

    #[test]
    fn protocol_position_is_readonly_here() {
        let accounts = accounts(vec![]);
        let metas = accounts.to_account_metas();
        assert_eq!(metas.len(), 16);
        let protocol = metas
            .iter()
            .find(|m| m.pubkey == accounts.protocol_position)
            .unwrap();
        assert!(!protocol.is_writable);
    }

    #[test]
    fn reward_triplets_append_in_order() {
        let reward = RewardAccounts {
            reward_vault: Pubkey::new_unique(),
            recipient_token_account: Pubkey::new_unique(),
            reward_mint: Pubkey::new_unique(),
        };
        let accounts = accounts(vec![reward.clone()]);
        let metas = accounts.to_account_metas();
        assert_eq!(metas.len(), 19);
        assert_eq!(metas[16].pubkey, reward.reward_vault);
        assert!(metas[16].is_writable);
        assert_eq!(metas[17].pubkey, reward.recipient_token_account);
        assert!(metas[17].is_writable);
        assert_eq!(metas[18].pubkey, reward.reward_mint);
        assert!(!metas[18].is_writable);
    }

    #[test]
    fn zero_delta_encodes_a_claim() {
        let args = DecreaseLiquidityArgs {
            liquidity: 0,
            amount_0_min: 0,
            amount_1_min: 0,
        };
        let ix = build(&accounts(vec![]), &args).unwrap();
        assert_eq!(&ix.data[..8], &anchor_discriminator(NAME));
        assert_eq!(&ix.data[8..24], &0u128.to_le_bytes());
        assert_eq!(ix.data.len(), 8 + 16 + 8 + 8);
    }
}
