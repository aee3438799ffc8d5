//! Fixed-layout codecs for the DLMM program's accounts.

use solana_sdk::pubkey::Pubkey;

use super::{anchor_account_discriminator, MAX_BIN_ID, MAX_POSITION_WIDTH, MIN_BIN_ID};
use crate::error::{DecodeError, Result};

/// Reward emission slots per pair.
pub const REWARD_SLOTS: usize = 2;
/// Byte width of one on-chain `RewardInfo`.
const REWARD_INFO_LEN: usize = 144;
/// First byte of the reward info block.
const REWARD_INFOS_OFFSET: usize = 264;
/// Oracle account pubkey, after the reward block.
const ORACLE_OFFSET: usize = REWARD_INFOS_OFFSET + REWARD_SLOTS * REWARD_INFO_LEN;
const LB_PAIR_MIN_LEN: usize = ORACLE_OFFSET + 32;

/// PositionV2: shares at 72, bounds after the share/fee/reward blocks.
const SHARES_OFFSET: usize = 72;
const LOWER_BIN_OFFSET: usize = 7912;
const UPPER_BIN_OFFSET: usize = 7916;
const POSITION_MIN_LEN: usize = 7920;

fn read_pubkey(data: &[u8], offset: usize) -> Pubkey {
    Pubkey::try_from(&data[offset..offset + 32]).expect("slice is exactly 32 bytes")
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(data[offset..offset + 2].try_into().expect("2 bytes"))
}

fn read_i32(data: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(data[offset..offset + 4].try_into().expect("4 bytes"))
}

fn read_u128(data: &[u8], offset: usize) -> u128 {
    u128::from_le_bytes(data[offset..offset + 16].try_into().expect("16 bytes"))
}

fn check_prefix(
    data: &[u8],
    min_len: usize,
    record: &'static str,
    account_name: &str,
) -> Result<()> {
    if data.len() < min_len {
        return Err(DecodeError::TooShort {
            need: min_len,
            got: data.len(),
        }
        .into());
    }
    let expected = anchor_account_discriminator(account_name);
    let found: [u8; 8] = data[..8].try_into().expect("8 bytes");
    if found != expected {
        return Err(DecodeError::WrongDiscriminator {
            record,
            expected,
            found,
        }
        .into());
    }
    Ok(())
}

/// One of the pair's two reward emission slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardInfo {
    pub mint: Pubkey,
    pub vault: Pubkey,
    pub funder: Pubkey,
}

impl RewardInfo {
    fn decode(data: &[u8], offset: usize) -> Self {
        Self {
            mint: read_pubkey(data, offset),
            vault: read_pubkey(data, offset + 32),
            funder: read_pubkey(data, offset + 64),
            // duration/rate/update counters follow; not needed client-side
        }
    }

    /// Unused slots keep the all-zero placeholder mint.
    pub fn is_initialized(&self) -> bool {
        self.mint != Pubkey::default()
    }
}

/// Decoded `LbPair` account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LbPair {
    pub active_id: i32,
    /// Bin step in basis points.
    pub bin_step: u16,
    pub base_factor: u16,
    pub mint_x: Pubkey,
    pub mint_y: Pubkey,
    pub reserve_x: Pubkey,
    pub reserve_y: Pubkey,
    pub oracle: Pubkey,
    pub reward_infos: [RewardInfo; REWARD_SLOTS],
}

impl LbPair {
    pub const ACCOUNT_NAME: &'static str = "LbPair";

    pub fn decode(data: &[u8]) -> Result<Self> {
        check_prefix(data, LB_PAIR_MIN_LEN, "LbPair", Self::ACCOUNT_NAME)?;

        let pair = Self {
            // static + variable parameter blocks occupy 8..72
            active_id: read_i32(data, 76),
            bin_step: read_u16(data, 80),
            base_factor: read_u16(data, 84),
            mint_x: read_pubkey(data, 88),
            mint_y: read_pubkey(data, 120),
            reserve_x: read_pubkey(data, 152),
            reserve_y: read_pubkey(data, 184),
            oracle: read_pubkey(data, ORACLE_OFFSET),
            reward_infos: [
                RewardInfo::decode(data, REWARD_INFOS_OFFSET),
                RewardInfo::decode(data, REWARD_INFOS_OFFSET + REWARD_INFO_LEN),
            ],
        };

        if pair.bin_step == 0 {
            return Err(DecodeError::InvalidRecord {
                record: "LbPair",
                field: "bin_step",
                value: "0".into(),
                constraint: "bin_step > 0".into(),
            }
            .into());
        }
        if !(MIN_BIN_ID..=MAX_BIN_ID).contains(&pair.active_id) {
            return Err(DecodeError::InvalidRecord {
                record: "LbPair",
                field: "active_id",
                value: pair.active_id.to_string(),
                constraint: format!("within [{MIN_BIN_ID}, {MAX_BIN_ID}]"),
            }
            .into());
        }
        Ok(pair)
    }

    pub fn live_rewards(&self) -> impl Iterator<Item = (usize, &RewardInfo)> {
        self.reward_infos
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_initialized())
    }
}

/// Decoded `PositionV2` account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionV2 {
    pub lb_pair: Pubkey,
    pub owner: Pubkey,
    pub lower_bin_id: i32,
    pub upper_bin_id: i32,
    /// Per-bin share for `lower_bin_id..=upper_bin_id`, capped at the
    /// record's 70-slot width.
    pub liquidity_shares: Vec<u128>,
}

impl PositionV2 {
    pub const ACCOUNT_NAME: &'static str = "PositionV2";

    pub fn decode(data: &[u8]) -> Result<Self> {
        check_prefix(data, POSITION_MIN_LEN, "PositionV2", Self::ACCOUNT_NAME)?;

        let lower_bin_id = read_i32(data, LOWER_BIN_OFFSET);
        let upper_bin_id = read_i32(data, UPPER_BIN_OFFSET);

        for (field, bin) in [("lower_bin_id", lower_bin_id), ("upper_bin_id", upper_bin_id)] {
            if !(MIN_BIN_ID..=MAX_BIN_ID).contains(&bin) {
                return Err(DecodeError::InvalidRecord {
                    record: "PositionV2",
                    field,
                    value: bin.to_string(),
                    constraint: format!("within [{MIN_BIN_ID}, {MAX_BIN_ID}]"),
                }
                .into());
            }
        }
        if lower_bin_id > upper_bin_id {
            return Err(DecodeError::InvalidRecord {
                record: "PositionV2",
                field: "lower_bin_id",
                value: lower_bin_id.to_string(),
                constraint: format!("lower_bin_id <= upper_bin_id ({upper_bin_id})"),
            }
            .into());
        }

        let width = (upper_bin_id - lower_bin_id + 1).min(MAX_POSITION_WIDTH) as usize;
        let liquidity_shares = (0..width)
            .map(|i| read_u128(data, SHARES_OFFSET + i * 16))
            .collect();

        Ok(Self {
            lb_pair: read_pubkey(data, 8),
            owner: read_pubkey(data, 40),
            lower_bin_id,
            upper_bin_id,
            liquidity_shares,
        })
    }

    pub fn total_liquidity(&self) -> u128 {
        self.liquidity_shares
            .iter()
            .fold(0u128, |acc, s| acc.saturating_add(*s))
    }

    /// Bin ids holding nonzero shares.
    pub fn active_bins(&self) -> Vec<i32> {
        self.liquidity_shares
            .iter()
            .enumerate()
            .filter(|(_, share)| **share > 0)
            .map(|(i, _)| self.lower_bin_id + i as i32)
            .collect()
    }
}

/// Memcmp offset of the owner field, used to scan positions by owner.
pub const POSITION_OWNER_OFFSET: usize = 40;
