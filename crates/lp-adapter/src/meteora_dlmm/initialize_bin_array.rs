//! `initialize_bin_array` — allocate the fixed 70-bin window holding part
//! of a position's range. Emitted only for windows a fresh read showed
//! absent; the check-then-create pattern is idempotent at the plan level.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::{anchor_discriminator, DLMM_PROGRAM_ID};
use crate::error::Result;
use crate::utils::SYSTEM_PROGRAM_ID;

pub const NAME: &str = "initialize_bin_array";

#[derive(Debug, Clone, BorshSerialize)]
pub struct InitializeBinArrayArgs {
    pub index: i64,
}

#[derive(Debug, Clone)]
pub struct InitializeBinArrayAccounts {
    pub lb_pair: Pubkey,
    pub bin_array: Pubkey,
    pub funder: Pubkey,
}

impl InitializeBinArrayAccounts {
    pub fn to_account_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new_readonly(self.lb_pair, false),
            AccountMeta::new(self.bin_array, false),
            AccountMeta::new(self.funder, true),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ]
    }
}

pub fn build(
    accounts: &InitializeBinArrayAccounts,
    args: &InitializeBinArrayArgs,
) -> Result<Instruction> {
    let mut data = anchor_discriminator(NAME).to_vec();
    args.serialize(&mut data)?;
    Ok(Instruction {
        program_id: DLMM_PROGRAM_ID,
        accounts: accounts.to_account_metas(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_little_endian_i64() {
        let accounts = InitializeBinArrayAccounts {
            lb_pair: Pubkey::new_unique(),
            bin_array: Pubkey::new_unique(),
            funder: Pubkey::new_unique(),
        };
        let ix = build(&accounts, &InitializeBinArrayArgs { index: -3 }).unwrap();
        assert_eq!(ix.accounts.len(), 4);
        assert_eq!(&ix.data[..8], &anchor_discriminator(NAME));
        assert_eq!(&ix.data[8..16], &(-3i64).to_le_bytes());
    }
}
