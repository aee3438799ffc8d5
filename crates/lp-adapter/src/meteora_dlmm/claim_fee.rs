//! `claim_fee` / `claim_fee2` — collect swap fees accrued by a position.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::{anchor_discriminator, RemainingAccountsInfo, DLMM_PROGRAM_ID};
use crate::error::Result;
use crate::utils::{MEMO_PROGRAM_ID, TOKEN_PROGRAM_ID};

pub const NAME: &str = "claim_fee";
pub const NAME_V2: &str = "claim_fee2";

#[derive(Debug, Clone)]
pub struct ClaimFeeAccounts {
    pub lb_pair: Pubkey,
    pub position: Pubkey,
    pub bin_array_lower: Pubkey,
    pub bin_array_upper: Pubkey,
    pub sender: Pubkey,
    pub reserve_x: Pubkey,
    pub reserve_y: Pubkey,
    pub user_token_x: Pubkey,
    pub user_token_y: Pubkey,
    pub token_x_mint: Pubkey,
    pub token_y_mint: Pubkey,
    pub token_x_program: Pubkey,
    pub token_y_program: Pubkey,
    pub event_authority: Pubkey,
}

impl ClaimFeeAccounts {
    pub fn requires_v2(&self) -> bool {
        self.token_x_program != TOKEN_PROGRAM_ID || self.token_y_program != TOKEN_PROGRAM_ID
    }

    fn v1_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.lb_pair, false),
            AccountMeta::new(self.position, false),
            AccountMeta::new(self.bin_array_lower, false),
            AccountMeta::new(self.bin_array_upper, false),
            AccountMeta::new_readonly(self.sender, true),
            AccountMeta::new(self.reserve_x, false),
            AccountMeta::new(self.reserve_y, false),
            AccountMeta::new(self.user_token_x, false),
            AccountMeta::new(self.user_token_y, false),
            AccountMeta::new_readonly(self.token_x_mint, false),
            AccountMeta::new_readonly(self.token_y_mint, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(self.event_authority, false),
            AccountMeta::new_readonly(DLMM_PROGRAM_ID, false),
        ]
    }

    fn v2_metas(&self) -> Vec<AccountMeta> {
        let mut metas = vec![
            AccountMeta::new(self.lb_pair, false),
            AccountMeta::new(self.position, false),
            AccountMeta::new_readonly(self.sender, true),
            AccountMeta::new(self.reserve_x, false),
            AccountMeta::new(self.reserve_y, false),
            AccountMeta::new(self.user_token_x, false),
            AccountMeta::new(self.user_token_y, false),
            AccountMeta::new_readonly(self.token_x_mint, false),
            AccountMeta::new_readonly(self.token_y_mint, false),
            AccountMeta::new_readonly(self.token_x_program, false),
            AccountMeta::new_readonly(self.token_y_program, false),
            AccountMeta::new_readonly(MEMO_PROGRAM_ID, false),
            AccountMeta::new_readonly(self.event_authority, false),
            AccountMeta::new_readonly(DLMM_PROGRAM_ID, false),
        ];
        metas.push(AccountMeta::new(self.bin_array_lower, false));
        if self.bin_array_upper != self.bin_array_lower {
            metas.push(AccountMeta::new(self.bin_array_upper, false));
        }
        metas
    }
}

/// The v2 encoding scopes the claim to the position's bin bounds.
#[derive(Debug, Clone, BorshSerialize)]
pub struct ClaimFeeV2Args {
    pub min_bin_id: i32,
    pub max_bin_id: i32,
}

pub fn build(accounts: &ClaimFeeAccounts, bounds: (i32, i32)) -> Result<Instruction> {
    if accounts.requires_v2() {
        let mut data = anchor_discriminator(NAME_V2).to_vec();
        ClaimFeeV2Args {
            min_bin_id: bounds.0,
            max_bin_id: bounds.1,
        }
        .serialize(&mut data)?;
        RemainingAccountsInfo::empty_hooks().serialize(&mut data)?;
        Ok(Instruction {
            program_id: DLMM_PROGRAM_ID,
            accounts: accounts.v2_metas(),
            data,
        })
    } else {
        Ok(Instruction {
            program_id: DLMM_PROGRAM_ID,
            accounts: accounts.v1_metas(),
            data: anchor_discriminator(NAME).to_vec(),
        })
    }
}
