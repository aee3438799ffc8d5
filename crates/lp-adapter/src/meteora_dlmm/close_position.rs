//! `close_position` — close an emptied position account and return its
//! rent. Liquidity and fees must already be withdrawn/claimed.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::{anchor_discriminator, DLMM_PROGRAM_ID};

pub const NAME: &str = "close_position";

#[derive(Debug, Clone)]
pub struct ClosePositionAccounts {
    pub position: Pubkey,
    pub lb_pair: Pubkey,
    pub bin_array_lower: Pubkey,
    pub bin_array_upper: Pubkey,
    pub sender: Pubkey,
    pub rent_receiver: Pubkey,
    pub event_authority: Pubkey,
}

impl ClosePositionAccounts {
    pub fn to_account_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.position, false),
            AccountMeta::new(self.lb_pair, false),
            AccountMeta::new(self.bin_array_lower, false),
            AccountMeta::new(self.bin_array_upper, false),
            AccountMeta::new_readonly(self.sender, true),
            AccountMeta::new(self.rent_receiver, false),
            AccountMeta::new_readonly(self.event_authority, false),
            AccountMeta::new_readonly(DLMM_PROGRAM_ID, false),
        ]
    }
}

pub fn build(accounts: &ClosePositionAccounts) -> Instruction {
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
    fn rent_flows_to_the_receiver() {
        let accounts = ClosePositionAccounts {
            position: Pubkey::new_unique(),
            lb_pair: Pubkey::new_unique(),
            bin_array_lower: Pubkey::new_unique(),
            bin_array_upper: Pubkey::new_unique(),
            sender: Pubkey::new_unique(),
            rent_receiver: Pubkey::new_unique(),
            event_authority: Pubkey::new_unique(),
        };
        let ix = build(&accounts);
        assert_eq!(ix.data, anchor_discriminator(NAME).to_vec());
        assert_eq!(ix.accounts.len(), 8);
        let receiver = ix
            .accounts
            .iter()
            .find(|m| m.pubkey == accounts.rent_receiver)
            .unwrap();
        assert!(receiver.is_writable && !receiver.is_signer);
    }
}
