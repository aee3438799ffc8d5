//! `remove_liquidity_by_range` / `remove_liquidity_by_range2` — withdraw a
//! basis-point share of every bin in `[from_bin_id, to_bin_id]`.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::{anchor_discriminator, RemainingAccountsInfo, DLMM_PROGRAM_ID};
use crate::error::Result;
use crate::utils::{MEMO_PROGRAM_ID, TOKEN_PROGRAM_ID};

pub const NAME: &str = "remove_liquidity_by_range";
pub const NAME_V2: &str = "remove_liquidity_by_range2";

#[derive(Debug, Clone, BorshSerialize)]
pub struct RemoveLiquidityArgs {
    pub from_bin_id: i32,
    pub to_bin_id: i32,
    /// 10_000 removes everything.
    pub bps_to_remove: u16,
}

#[derive(Debug, Clone)]
pub struct RemoveLiquidityAccounts {
    pub position: Pubkey,
    pub lb_pair: Pubkey,
    pub bin_array_bitmap_extension: Option<Pubkey>,
    pub user_token_x: Pubkey,
    pub user_token_y: Pubkey,
    pub reserve_x: Pubkey,
    pub reserve_y: Pubkey,
    pub token_x_mint: Pubkey,
    pub token_y_mint: Pubkey,
    pub bin_array_lower: Pubkey,
    pub bin_array_upper: Pubkey,
    pub sender: Pubkey,
    pub token_x_program: Pubkey,
    pub token_y_program: Pubkey,
    pub event_authority: Pubkey,
}

impl RemoveLiquidityAccounts {
    pub fn requires_v2(&self) -> bool {
        self.token_x_program != TOKEN_PROGRAM_ID || self.token_y_program != TOKEN_PROGRAM_ID
    }

    fn bitmap_meta(&self) -> AccountMeta {
        match self.bin_array_bitmap_extension {
            Some(address) => AccountMeta::new(address, false),
            None => AccountMeta::new_readonly(DLMM_PROGRAM_ID, false),
        }
    }

    fn v1_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.position, false),
            AccountMeta::new(self.lb_pair, false),
            self.bitmap_meta(),
            AccountMeta::new(self.user_token_x, false),
            AccountMeta::new(self.user_token_y, false),
            AccountMeta::new(self.reserve_x, false),
            AccountMeta::new(self.reserve_y, false),
            AccountMeta::new_readonly(self.token_x_mint, false),
            AccountMeta::new_readonly(self.token_y_mint, false),
            AccountMeta::new(self.bin_array_lower, false),
            AccountMeta::new(self.bin_array_upper, false),
            AccountMeta::new_readonly(self.sender, true),
            AccountMeta::new_readonly(self.token_x_program, false),
            AccountMeta::new_readonly(self.token_y_program, false),
            AccountMeta::new_readonly(self.event_authority, false),
            AccountMeta::new_readonly(DLMM_PROGRAM_ID, false),
        ]
    }

    fn v2_metas(&self) -> Vec<AccountMeta> {
        let mut metas = vec![
            AccountMeta::new(self.position, false),
            AccountMeta::new(self.lb_pair, false),
            self.bitmap_meta(),
            AccountMeta::new(self.user_token_x, false),
            AccountMeta::new(self.user_token_y, false),
            AccountMeta::new(self.reserve_x, false),
            AccountMeta::new(self.reserve_y, false),
            AccountMeta::new_readonly(self.token_x_mint, false),
            AccountMeta::new_readonly(self.token_y_mint, false),
            AccountMeta::new_readonly(self.sender, true),
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

pub fn build(accounts: &RemoveLiquidityAccounts, args: &RemoveLiquidityArgs) -> Result<Instruction> {
    if accounts.requires_v2() {
        let mut data = anchor_discriminator(NAME_V2).to_vec();
        args.serialize(&mut data)?;
        RemainingAccountsInfo::empty_hooks().serialize(&mut data)?;
        Ok(Instruction {
            program_id: DLMM_PROGRAM_ID,
            accounts: accounts.v2_metas(),
            data,
        })
    } else {
        let mut data = anchor_discriminator(NAME).to_vec();
        args.serialize(&mut data)?;
        Ok(Instruction {
            program_id: DLMM_PROGRAM_ID,
            accounts: accounts.v1_metas(),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::TOKEN_2022_PROGRAM_ID;

    fn accounts(token_x_program: Pubkey) -> RemoveLiquidityAccounts {
        RemoveLiquidityAccounts {
            position: Pubkey::new_unique(),
            lb_pair: Pubkey::new_unique(),
            bin_array_bitmap_extension: Some(Pubkey::new_unique()),
            user_token_x: Pubkey::new_unique(),
            user_token_y: Pubkey::new_unique(),
            reserve_x: Pubkey::new_unique(),
            reserve_y: Pubkey::new_unique(),
            token_x_mint: Pubkey::new_unique(),
            token_y_mint: Pubkey::new_unique(),
            bin_array_lower: Pubkey::new_unique(),
            bin_array_upper: Pubkey::new_unique(),
            sender: Pubkey::new_unique(),
            token_x_program,
            token_y_program: TOKEN_PROGRAM_ID,
            event_authority: Pubkey::new_unique(),
        }
    }

    #[test]
    fn full_removal_packs_ten_thousand_bps() {
        let accounts = accounts(TOKEN_PROGRAM_ID);
        let args = RemoveLiquidityArgs {
            from_bin_id: -10,
            to_bin_id: 10,
            bps_to_remove: 10_000,
        };
        let ix = build(&accounts, &args).unwrap();
        assert_eq!(&ix.data[..8], &anchor_discriminator(NAME));
        assert_eq!(&ix.data[8..12], &(-10i32).to_le_bytes());
        assert_eq!(&ix.data[12..16], &10i32.to_le_bytes());
        assert_eq!(&ix.data[16..18], &10_000u16.to_le_bytes());
        assert_eq!(ix.accounts.len(), 16);
        // the bitmap extension is writable when present
        assert!(ix.accounts[2].is_writable);
    }

    #[test]
    fn v2_adds_memo_and_moves_bin_arrays_to_the_tail() {
        let accounts = accounts(TOKEN_2022_PROGRAM_ID);
        let args = RemoveLiquidityArgs {
            from_bin_id: 0,
            to_bin_id: 1,
            bps_to_remove: 5_000,
        };
        let ix = build(&accounts, &args).unwrap();
        assert_eq!(&ix.data[..8], &anchor_discriminator(NAME_V2));
        assert!(ix.accounts.iter().any(|m| m.pubkey == MEMO_PROGRAM_ID));
        assert_eq!(ix.accounts.last().unwrap().pubkey, accounts.bin_array_upper);
    }
}
