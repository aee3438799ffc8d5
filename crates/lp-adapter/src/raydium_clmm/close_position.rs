//! `close_position` — burn the position NFT and reclaim rent.
//!
//! The program rejects this instruction while the position still holds
//! liquidity or unclaimed fees/rewards; callers must decrease to zero and
//! claim first (see the adapter's close sequencing).

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::{anchor_discriminator, CLMM_PROGRAM_ID};
use crate::utils::SYSTEM_PROGRAM_ID;

pub const NAME: &str = "close_position";

#[derive(Debug, Clone)]
pub struct ClosePositionAccounts {
    /// Receives the reclaimed rent, hence writable.
    pub nft_owner: Pubkey,
    pub position_nft_mint: Pubkey,
    pub position_nft_account: Pubkey,
    pub personal_position: Pubkey,
    /// Token program owning the NFT mint (legacy or Token-2022).
    pub nft_token_program: Pubkey,
}

impl ClosePositionAccounts {
    pub fn to_account_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.nft_owner, true),
            AccountMeta::new(self.position_nft_mint, false),
            AccountMeta::new(self.position_nft_account, false),
            AccountMeta::new(self.personal_position, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(self.nft_token_program, false),
        ]
    }
}

pub fn build(accounts: &ClosePositionAccounts) -> Instruction {
    Instruction {
        program_id: CLMM_PROGRAM_ID,
        accounts: accounts.to_account_metas(),
        data: anchor_discriminator(NAME).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::TOKEN_2022_PROGRAM_ID;

    #[test]
    fn close_has_no_arguments_and_owner_receives_rent() {
        let accounts = ClosePositionAccounts {
            nft_owner: Pubkey::new_unique(),
            position_nft_mint: Pubkey::new_unique(),
            position_nft_account: Pubkey::new_unique(),
            personal_position: Pubkey::new_unique(),
            nft_token_program: TOKEN_2022_PROGRAM_ID,
        };
        let ix = build(&accounts);
        assert_eq!(ix.data, anchor_discriminator(NAME).to_vec());
        assert_eq!(ix.accounts.len(), 6);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert_eq!(ix.accounts[5].pubkey, TOKEN_2022_PROGRAM_ID);
    }
}
