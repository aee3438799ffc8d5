//! `initialize_position` — create a position account for a bin range.
//!
//! The position is a fresh keypair, not a PDA: both the payer and the new
//! position account sign.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::{anchor_discriminator, DLMM_PROGRAM_ID};
use crate::error::Result;
use crate::utils::{RENT_SYSVAR_ID, SYSTEM_PROGRAM_ID};

pub const NAME: &str = "initialize_position";

#[derive(Debug, Clone, BorshSerialize)]
pub struct InitializePositionArgs {
    pub lower_bin_id: i32,
    pub width: i32,
}

#[derive(Debug, Clone)]
pub struct InitializePositionAccounts {
    pub payer: Pubkey,
    pub position: Pubkey,
    pub lb_pair: Pubkey,
    pub owner: Pubkey,
    pub event_authority: Pubkey,
}

impl InitializePositionAccounts {
    pub fn to_account_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.payer, true),
            AccountMeta::new(self.position, true),
            AccountMeta::new_readonly(self.lb_pair, false),
            AccountMeta::new_readonly(self.owner, true),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
            AccountMeta::new_readonly(self.event_authority, false),
            AccountMeta::new_readonly(DLMM_PROGRAM_ID, false),
        ]
    }
}

pub fn build(
    accounts: &InitializePositionAccounts,
    args: &InitializePositionArgs,
) -> Result<Instruction> {
    let mut data = anchor_discriminator(NAME).to_vec();
    args.serialize(&mut data)?;
    Ok(Instruction {
        program_id: DLMM_PROGRAM_ID,
        accounts: accounts.to_account_metas(),
        data,
    })
}
