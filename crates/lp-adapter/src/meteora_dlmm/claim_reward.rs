//! `claim_reward` — collect emissions from one of the pair's reward slots.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::{anchor_discriminator, DLMM_PROGRAM_ID};
use crate::error::Result;
use crate::utils::TOKEN_PROGRAM_ID;

pub const NAME: &str = "claim_reward";

#[derive(Debug, Clone, BorshSerialize)]
pub struct ClaimRewardArgs {
    pub reward_index: u64,
}

#[derive(Debug, Clone)]
pub struct ClaimRewardAccounts {
    pub lb_pair: Pubkey,
    pub position: Pubkey,
    pub bin_array_lower: Pubkey,
    pub bin_array_upper: Pubkey,
    pub sender: Pubkey,
    pub reward_vault: Pubkey,
    pub reward_mint: Pubkey,
    pub user_token_account: Pubkey,
    pub event_authority: Pubkey,
}

impl ClaimRewardAccounts {
    pub fn to_account_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.lb_pair, false),
            AccountMeta::new(self.position, false),
            AccountMeta::new(self.bin_array_lower, false),
            AccountMeta::new(self.bin_array_upper, false),
            AccountMeta::new_readonly(self.sender, true),
            AccountMeta::new(self.reward_vault, false),
            AccountMeta::new_readonly(self.reward_mint, false),
            AccountMeta::new(self.user_token_account, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(self.event_authority, false),
            AccountMeta::new_readonly(DLMM_PROGRAM_ID, false),
        ]
    }
}

pub fn build(accounts: &ClaimRewardAccounts, args: &ClaimRewardArgs) -> Result<Instruction> {
    let mut data = anchor_discriminator(NAME).to_vec();
    args.serialize(&mut data)?;
    Ok(Instruction {
        program_id: DLMM_PROGRAM_ID,
        accounts: accounts.to_account_metas(),
        data,
    })
}
