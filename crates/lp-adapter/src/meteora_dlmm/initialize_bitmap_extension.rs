//! `initialize_bin_array_bitmap_extension` — allocate the bitmap extension
//! that tracks bin arrays outside the pair's built-in bitmap window. Needed
//! once per pair before wide-range liquidity can be added.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::{anchor_discriminator, DLMM_PROGRAM_ID};
use crate::utils::{RENT_SYSVAR_ID, SYSTEM_PROGRAM_ID};

pub const NAME: &str = "initialize_bin_array_bitmap_extension";

#[derive(Debug, Clone)]
pub struct InitializeBitmapExtensionAccounts {
    pub lb_pair: Pubkey,
    pub bin_array_bitmap_extension: Pubkey,
    pub funder: Pubkey,
}

impl InitializeBitmapExtensionAccounts {
    pub fn to_account_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new_readonly(self.lb_pair, false),
            AccountMeta::new(self.bin_array_bitmap_extension, false),
            AccountMeta::new(self.funder, true),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
        ]
    }
}

pub fn build(accounts: &InitializeBitmapExtensionAccounts) -> Instruction {
    Instruction {
        program_id: DLMM_PROGRAM_ID,
        accounts: accounts.to_account_metas(),
        data: anchor_discriminator(NAME).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn funder_pays_and_signs() {
        let accounts = InitializeBitmapExtensionAccounts {
            lb_pair: Pubkey::new_unique(),
            bin_array_bitmap_extension: Pubkey::new_unique(),
            funder: Pubkey::new_unique(),
        };
        let ix = build(&accounts);
        assert_eq!(ix.accounts.len(), 5);
        assert!(ix.accounts[2].is_signer && ix.accounts[2].is_writable);
        assert_eq!(ix.data, anchor_discriminator(NAME).to_vec());
    }
}
