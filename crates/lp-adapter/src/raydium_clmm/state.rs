//! Fixed-layout codecs for the CLMM program's accounts.
//!
//! Offsets are part of the program's public interface and must not drift;
//! each decoder checks length, then the Anchor discriminator, then reads
//! little-endian fields at fixed offsets, then applies domain sanity checks.

use solana_sdk::pubkey::Pubkey;

use super::{anchor_account_discriminator, MAX_TICK, MIN_TICK};
use crate::error::{DecodeError, Result};

/// Reward emission slots per pool.
pub const REWARD_SLOTS: usize = 3;
/// Byte width of one on-chain `RewardInfo`.
const REWARD_INFO_LEN: usize = 169;
/// First byte of the reward info block.
const REWARD_INFOS_OFFSET: usize = 417;
/// Minimum pool account length this decoder touches.
const POOL_STATE_MIN_LEN: usize = REWARD_INFOS_OFFSET + REWARD_SLOTS * REWARD_INFO_LEN;

fn read_pubkey(data: &[u8], offset: usize) -> Pubkey {
    Pubkey::try_from(&data[offset..offset + 32]).expect("slice is exactly 32 bytes")
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(data[offset..offset + 2].try_into().expect("2 bytes"))
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(data[offset..offset + 4].try_into().expect("4 bytes"))
}

fn read_i32(data: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(data[offset..offset + 4].try_into().expect("4 bytes"))
}

fn read_u64(data: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(data[offset..offset + 8].try_into().expect("8 bytes"))
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

/// One of the pool's reward emission slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardInfo {
    /// 0 = uninitialized, 1 = initialized, 2 = opening, 3 = ended.
    pub reward_state: u8,
    pub open_time: u64,
    pub end_time: u64,
    pub emissions_per_second_x64: u128,
    pub token_mint: Pubkey,
    pub token_vault: Pubkey,
}

impl RewardInfo {
    fn decode(data: &[u8], offset: usize) -> Self {
        Self {
            reward_state: data[offset],
            open_time: read_u64(data, offset + 1),
            end_time: read_u64(data, offset + 9),
            // last_update_time at +17 is not needed client-side
            emissions_per_second_x64: read_u128(data, offset + 25),
            // total_emissioned at +41, claimed at +49
            token_mint: read_pubkey(data, offset + 57),
            token_vault: read_pubkey(data, offset + 89),
        }
    }

    /// A slot counts as live when its state says so and the mint is not the
    /// all-zero placeholder left in unused slots.
    pub fn is_initialized(&self) -> bool {
        (1..=3).contains(&self.reward_state) && self.token_mint != Pubkey::default()
    }
}

/// Decoded `PoolState` account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolState {
    pub amm_config: Pubkey,
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub vault_a: Pubkey,
    pub vault_b: Pubkey,
    pub observation_key: Pubkey,
    pub mint_decimals_a: u8,
    pub mint_decimals_b: u8,
    pub tick_spacing: u16,
    pub liquidity: u128,
    pub sqrt_price_x64: u128,
    pub tick_current: i32,
    pub status: u8,
    pub reward_infos: [RewardInfo; REWARD_SLOTS],
}

impl PoolState {
    pub const ACCOUNT_NAME: &'static str = "PoolState";

    pub fn decode(data: &[u8]) -> Result<Self> {
        check_prefix(data, POOL_STATE_MIN_LEN, "PoolState", Self::ACCOUNT_NAME)?;

        let pool = Self {
            // bump at 8
            amm_config: read_pubkey(data, 9),
            // creator at 41
            mint_a: read_pubkey(data, 73),
            mint_b: read_pubkey(data, 105),
            vault_a: read_pubkey(data, 137),
            vault_b: read_pubkey(data, 169),
            observation_key: read_pubkey(data, 201),
            mint_decimals_a: data[233],
            mint_decimals_b: data[234],
            tick_spacing: read_u16(data, 235),
            liquidity: read_u128(data, 237),
            sqrt_price_x64: read_u128(data, 253),
            tick_current: read_i32(data, 269),
            // fee growth, protocol fees and swap totals: 277..409
            status: data[409],
            // 7 bytes padding, then 3 x 169-byte reward infos
            reward_infos: [
                RewardInfo::decode(data, REWARD_INFOS_OFFSET),
                RewardInfo::decode(data, REWARD_INFOS_OFFSET + REWARD_INFO_LEN),
                RewardInfo::decode(data, REWARD_INFOS_OFFSET + 2 * REWARD_INFO_LEN),
            ],
        };

        if pool.tick_spacing == 0 {
            return Err(DecodeError::InvalidRecord {
                record: "PoolState",
                field: "tick_spacing",
                value: "0".into(),
                constraint: "tick_spacing > 0".into(),
            }
            .into());
        }
        if !(MIN_TICK..=MAX_TICK).contains(&pool.tick_current) {
            return Err(DecodeError::InvalidRecord {
                record: "PoolState",
                field: "tick_current",
                value: pool.tick_current.to_string(),
                constraint: format!("within [{MIN_TICK}, {MAX_TICK}]"),
            }
            .into());
        }
        Ok(pool)
    }

    /// Reward slots that actually emit, in instruction-append order.
    pub fn live_rewards(&self) -> impl Iterator<Item = &RewardInfo> {
        self.reward_infos.iter().filter(|r| r.is_initialized())
    }
}

/// Decoded `AmmConfig` account: the pool's fee schedule and tick spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmmConfig {
    pub tick_spacing: u16,
    /// In 1e-6 units: 100 = 0.01%.
    pub trade_fee_rate: u32,
    /// Percentage of the trade fee.
    pub protocol_fee_rate: u16,
}

impl AmmConfig {
    pub const ACCOUNT_NAME: &'static str = "AmmConfig";

    pub fn decode(data: &[u8]) -> Result<Self> {
        check_prefix(data, 53, "AmmConfig", Self::ACCOUNT_NAME)?;
        Ok(Self {
            tick_spacing: read_u16(data, 45),
            trade_fee_rate: read_u32(data, 47),
            protocol_fee_rate: read_u16(data, 51),
        })
    }
}

/// Per-slot reward counters carried by a personal position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRewardInfo {
    pub growth_inside_last_x64: u128,
    pub reward_amount_owed: u64,
}

/// Decoded `PersonalPositionState` account, the NFT-identified position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalPosition {
    pub nft_mint: Pubkey,
    pub pool_id: Pubkey,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub token_fees_owed_a: u64,
    pub token_fees_owed_b: u64,
    pub reward_infos: [PositionRewardInfo; REWARD_SLOTS],
}

impl PersonalPosition {
    pub const ACCOUNT_NAME: &'static str = "PersonalPositionState";
    const MIN_LEN: usize = 145 + REWARD_SLOTS * 24;

    pub fn decode(data: &[u8]) -> Result<Self> {
        check_prefix(data, Self::MIN_LEN, "PersonalPosition", Self::ACCOUNT_NAME)?;

        let position = Self {
            // bump at 8
            nft_mint: read_pubkey(data, 9),
            pool_id: read_pubkey(data, 41),
            tick_lower: read_i32(data, 73),
            tick_upper: read_i32(data, 77),
            liquidity: read_u128(data, 81),
            // fee growth snapshots at 97 and 113
            token_fees_owed_a: read_u64(data, 129),
            token_fees_owed_b: read_u64(data, 137),
            reward_infos: std::array::from_fn(|i| PositionRewardInfo {
                growth_inside_last_x64: read_u128(data, 145 + i * 24),
                reward_amount_owed: read_u64(data, 145 + i * 24 + 16),
            }),
        };

        for (field, tick) in [
            ("tick_lower", position.tick_lower),
            ("tick_upper", position.tick_upper),
        ] {
            if !(MIN_TICK..=MAX_TICK).contains(&tick) {
                return Err(DecodeError::InvalidRecord {
                    record: "PersonalPosition",
                    field,
                    value: tick.to_string(),
                    constraint: format!("within [{MIN_TICK}, {MAX_TICK}]"),
                }
                .into());
            }
        }
        if position.tick_lower > position.tick_upper {
            return Err(DecodeError::InvalidRecord {
                record: "PersonalPosition",
                field: "tick_lower",
                value: position.tick_lower.to_string(),
                constraint: format!("tick_lower <= tick_upper ({})", position.tick_upper),
            }
            .into());
        }
        Ok(position)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a synthetic pool account with the given core fields at the
    /// documented offsets.
    pub(crate) fn synthetic_pool(
        mint_a: Pubkey,
        mint_b: Pubkey,
        decimals_a: u8,
        decimals_b: u8,
        tick_spacing: u16,
        sqrt_price_x64: u128,
        tick_current: i32,
        liquidity: u128,
    ) -> Vec<u8> {
        let mut data = vec![0u8; POOL_STATE_MIN_LEN];
        data[..8].copy_from_slice(&anchor_account_discriminator(PoolState::ACCOUNT_NAME));
        data[9..41].copy_from_slice(Pubkey::new_unique().as_ref()); // amm_config
        data[73..105].copy_from_slice(mint_a.as_ref());
        data[105..137].copy_from_slice(mint_b.as_ref());
        data[137..169].copy_from_slice(Pubkey::new_unique().as_ref()); // vault_a
        data[169..201].copy_from_slice(Pubkey::new_unique().as_ref()); // vault_b
        data[201..233].copy_from_slice(Pubkey::new_unique().as_ref()); // observation
        data[233] = decimals_a;
        data[234] = decimals_b;
        data[235..237].copy_from_slice(&tick_spacing.to_le_bytes());
        data[237..253].copy_from_slice(&liquidity.to_le_bytes());
        data[253..269].copy_from_slice(&sqrt_price_x64.to_le_bytes());
        data[269..273].copy_from_slice(&tick_current.to_le_bytes());
        data
    }

    pub(crate) fn synthetic_position(
        nft_mint: Pubkey,
        pool_id: Pubkey,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Vec<u8> {
        let mut data = vec![0u8; PersonalPosition::MIN_LEN];
        data[..8]
            .copy_from_slice(&anchor_account_discriminator(PersonalPosition::ACCOUNT_NAME));
        data[9..41].copy_from_slice(nft_mint.as_ref());
        data[41..73].copy_from_slice(pool_id.as_ref());
        data[73..77].copy_from_slice(&tick_lower.to_le_bytes());
        data[77..81].copy_from_slice(&tick_upper.to_le_bytes());
        data[81..97].copy_from_slice(&liquidity.to_le_bytes());
        data
    }

    #[test]
    fn pool_round_trips_through_the_documented_offsets() {
        let mint_a = Pubkey::new_unique();
        let mint_b = Pubkey::new_unique();
        let data = synthetic_pool(mint_a, mint_b, 9, 6, 10, super::super::Q64, -42, 777);
        let pool = PoolState::decode(&data).unwrap();
        assert_eq!(pool.mint_a, mint_a);
        assert_eq!(pool.mint_b, mint_b);
        assert_eq!(pool.mint_decimals_a, 9);
        assert_eq!(pool.mint_decimals_b, 6);
        assert_eq!(pool.tick_spacing, 10);
        assert_eq!(pool.sqrt_price_x64, super::super::Q64);
        assert_eq!(pool.tick_current, -42);
        assert_eq!(pool.liquidity, 777);
        assert!(pool.live_rewards().next().is_none());
    }

    #[test]
    fn short_buffer_fails_too_short() {
        let err = PoolState::decode(&[0u8; 64]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Decode(DecodeError::TooShort { .. })
        ));
    }

    #[test]
    fn wrong_discriminator_is_rejected() {
        let mut data =
            synthetic_pool(Pubkey::new_unique(), Pubkey::new_unique(), 6, 6, 1, 1, 0, 0);
        data[..8].copy_from_slice(&anchor_account_discriminator("SomethingElse"));
        let err = PoolState::decode(&data).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Decode(DecodeError::WrongDiscriminator { .. })
        ));
    }

    #[test]
    fn zero_tick_spacing_is_semantically_invalid() {
        let data = synthetic_pool(Pubkey::new_unique(), Pubkey::new_unique(), 6, 6, 0, 1, 0, 0);
        let err = PoolState::decode(&data).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Decode(DecodeError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn position_round_trips_and_validates_bounds() {
        let nft = Pubkey::new_unique();
        let pool = Pubkey::new_unique();
        let data = synthetic_position(nft, pool, -120, 120, 555);
        let position = PersonalPosition::decode(&data).unwrap();
        assert_eq!(position.nft_mint, nft);
        assert_eq!(position.pool_id, pool);
        assert_eq!(position.tick_lower, -120);
        assert_eq!(position.tick_upper, 120);
        assert_eq!(position.liquidity, 555);

        let inverted = synthetic_position(nft, pool, 120, -120, 0);
        assert!(PersonalPosition::decode(&inverted).is_err());
    }

    #[test]
    fn position_boundary_values_survive_decoding() {
        let data = synthetic_position(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            super::super::MIN_TICK,
            super::super::MAX_TICK,
            0,
        );
        let position = PersonalPosition::decode(&data).unwrap();
        assert_eq!(position.tick_lower, super::super::MIN_TICK);
        assert_eq!(position.tick_upper, super::super::MAX_TICK);
        assert_eq!(position.liquidity, 0);

        let out_of_bounds = synthetic_position(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            super::super::MIN_TICK - 1,
            0,
            0,
        );
        assert!(PersonalPosition::decode(&out_of_bounds).is_err());
    }

    #[test]
    fn amm_config_reads_fee_fields() {
        let mut data = vec![0u8; 60];
        data[..8].copy_from_slice(&anchor_account_discriminator(AmmConfig::ACCOUNT_NAME));
        data[45..47].copy_from_slice(&10u16.to_le_bytes());
        data[47..51].copy_from_slice(&2500u32.to_le_bytes());
        data[51..53].copy_from_slice(&12u16.to_le_bytes());
        let config = AmmConfig::decode(&data).unwrap();
        assert_eq!(config.tick_spacing, 10);
        assert_eq!(config.trade_fee_rate, 2500);
        assert_eq!(config.protocol_fee_rate, 12);
    }
}
