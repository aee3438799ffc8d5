//! `add_liquidity_by_strategy` / `add_liquidity_by_strategy2` — deposit
//! into a position with a distribution strategy.
//!
//! The `2` encoding is selected when either pool mint lives under
//! Token-2022: it moves the bin arrays into the trailing account list and
//! appends empty transfer-hook slices. Selection is decided by the observed
//! mint owners before building; only one variant is ever emitted.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use super::{
    anchor_discriminator, LiquidityParameterByStrategy, RemainingAccountsInfo, DLMM_PROGRAM_ID,
};
use crate::error::Result;
use crate::utils::TOKEN_PROGRAM_ID;

pub const NAME: &str = "add_liquidity_by_strategy";
pub const NAME_V2: &str = "add_liquidity_by_strategy2";

/// Accounts shared by the deposit variants. `bin_array_lower`/`upper` are
/// the windows containing the position bounds; a position is at most 70
/// bins wide, so two windows always suffice.
#[derive(Debug, Clone)]
pub struct AddLiquidityAccounts {
    pub position: Pubkey,
    pub lb_pair: Pubkey,
    /// Present once the pair has a bitmap extension account.
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

impl AddLiquidityAccounts {
    /// Token-program heterogeneity forces the `2` encoding.
    pub fn requires_v2(&self) -> bool {
        self.token_x_program != TOKEN_PROGRAM_ID || self.token_y_program != TOKEN_PROGRAM_ID
    }

    /// Anchor encodes an absent optional account as the program id itself.
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
            AccountMeta::new_readonly(self.event_authority, false),
            AccountMeta::new_readonly(DLMM_PROGRAM_ID, false),
        ];
        // bin arrays ride in the trailing account list in the v2 encoding
        metas.push(AccountMeta::new(self.bin_array_lower, false));
        if self.bin_array_upper != self.bin_array_lower {
            metas.push(AccountMeta::new(self.bin_array_upper, false));
        }
        metas
    }
}

pub fn build(
    accounts: &AddLiquidityAccounts,
    params: &LiquidityParameterByStrategy,
) -> Result<Instruction> {
    if accounts.requires_v2() {
        let mut data = anchor_discriminator(NAME_V2).to_vec();
        params.serialize(&mut data)?;
        RemainingAccountsInfo::empty_hooks().serialize(&mut data)?;
        Ok(Instruction {
            program_id: DLMM_PROGRAM_ID,
            accounts: accounts.v2_metas(),
            data,
        })
    } else {
        let mut data = anchor_discriminator(NAME).to_vec();
        params.serialize(&mut data)?;
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
    use crate::meteora_dlmm::StrategyParameters;
    use crate::utils::TOKEN_2022_PROGRAM_ID;

    fn accounts(token_y_program: Pubkey) -> AddLiquidityAccounts {
        AddLiquidityAccounts {
            position: Pubkey::new_unique(),
            lb_pair: Pubkey::new_unique(),
            bin_array_bitmap_extension: None,
            user_token_x: Pubkey::new_unique(),
            user_token_y: Pubkey::new_unique(),
            reserve_x: Pubkey::new_unique(),
            reserve_y: Pubkey::new_unique(),
            token_x_mint: Pubkey::new_unique(),
            token_y_mint: Pubkey::new_unique(),
            bin_array_lower: Pubkey::new_unique(),
            bin_array_upper: Pubkey::new_unique(),
            sender: Pubkey::new_unique(),
            token_x_program: TOKEN_PROGRAM_ID,
            token_y_program,
            event_authority: Pubkey::new_unique(),
        }
    }

    fn params() -> LiquidityParameterByStrategy {
        LiquidityParameterByStrategy {
            amount_x: 1_000,
            amount_y: 2_000,
            active_id: 50,
            max_active_bin_slippage: 5,
            strategy_parameters: StrategyParameters::spot_balanced(40, 60),
        }
    }

    #[test]
    fn homogeneous_mints_build_v1() {
        let accounts = accounts(TOKEN_PROGRAM_ID);
        let ix = build(&accounts, &params()).unwrap();
        assert_eq!(&ix.data[..8], &anchor_discriminator(NAME));
        assert_eq!(ix.accounts.len(), 16);
        assert_eq!(ix.accounts[9].pubkey, accounts.bin_array_lower);
        assert_eq!(ix.accounts[10].pubkey, accounts.bin_array_upper);
        // absent bitmap extension is the program id placeholder
        assert_eq!(ix.accounts[2].pubkey, DLMM_PROGRAM_ID);
        // args: amounts, active id, slippage, then strategy block
        assert_eq!(&ix.data[8..16], &1_000u64.to_le_bytes());
        assert_eq!(&ix.data[16..24], &2_000u64.to_le_bytes());
        assert_eq!(&ix.data[24..28], &50i32.to_le_bytes());
        assert_eq!(&ix.data[28..32], &5i32.to_le_bytes());
        assert_eq!(ix.data.len(), 8 + 24 + 73);
    }

    #[test]
    fn token_2022_side_selects_v2_with_trailing_bin_arrays() {
        let accounts = accounts(TOKEN_2022_PROGRAM_ID);
        let ix = build(&accounts, &params()).unwrap();
        assert_eq!(&ix.data[..8], &anchor_discriminator(NAME_V2));
        assert_eq!(ix.accounts.len(), 16);
        let trailing: Vec<&Pubkey> = ix.accounts[14..].iter().map(|m| &m.pubkey).collect();
        assert_eq!(
            trailing,
            vec![&accounts.bin_array_lower, &accounts.bin_array_upper]
        );
        // remaining-accounts info with the two empty hook slices is appended
        assert_eq!(ix.data.len(), 8 + 24 + 73 + 8);
    }

    #[test]
    fn single_spanned_array_is_not_duplicated_in_v2() {
        let mut accounts = accounts(TOKEN_2022_PROGRAM_ID);
        accounts.bin_array_upper = accounts.bin_array_lower;
        let ix = build(&accounts, &params()).unwrap();
        assert_eq!(ix.accounts.len(), 15);
    }
}
