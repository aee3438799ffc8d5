//! Caller-facing records produced by the adapters.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, signature::Keypair};

/// Which discretization family a pool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolKind {
    /// Tick-based CLMM (Raydium).
    Tick,
    /// Bin-based DLMM (Meteora).
    Bin,
}

impl ProtocolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::Bin => "bin",
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde_as(as = "DisplayFromStr")]
    pub mint: Pubkey,
    pub decimals: u8,
}

/// One reward emission slot of a pool, surfaced only when initialized.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSlot {
    #[serde_as(as = "DisplayFromStr")]
    pub mint: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub vault: Pubkey,
}

/// A decoded pool, reduced to what callers need to reason about a position.
/// Read-only from this crate's perspective: only the on-chain program
/// mutates pool state.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSnapshot {
    #[serde_as(as = "DisplayFromStr")]
    pub address: Pubkey,
    pub protocol: ProtocolKind,
    pub token_a: Token,
    pub token_b: Token,
    /// Token A priced in token B at the current tick/bin.
    pub price: Decimal,
    /// Tick spacing or bin step, depending on `protocol`.
    pub step: u16,
    /// Current tick or active bin id.
    pub current_unit: i32,
    /// Pool-wide liquidity (tick family) or zero for the bin family, whose
    /// depth lives in per-bin shares.
    pub liquidity: u128,
    pub rewards: Vec<RewardSlot>,
}

/// A decoded position.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// Position identity: the NFT mint (tick family) or the position
    /// account address (bin family).
    #[serde_as(as = "DisplayFromStr")]
    pub id: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub pool: Pubkey,
    pub protocol: ProtocolKind,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub owner: Option<Pubkey>,
    /// Inclusive discretized bounds.
    pub lower_unit: i32,
    pub upper_unit: i32,
    pub price_lower: Decimal,
    pub price_upper: Decimal,
    /// Total liquidity: the position's liquidity field (tick family) or the
    /// sum of per-bin shares (bin family).
    pub liquidity: u128,
    /// Bin ids holding nonzero shares; empty for the tick family.
    pub active_units: Vec<i32>,
    /// Uncollected fees, where the record tracks them.
    pub fees_owed_a: u64,
    pub fees_owed_b: u64,
    /// Derived, not stored: whether the pool's current unit is inside
    /// `[lower_unit, upper_unit]`.
    pub in_range: bool,
}

/// The terminal output of every lifecycle operation: an ordered instruction
/// list plus any extra keypairs that must co-sign (position mints/accounts
/// generated during the build). Handing this to a signer/broadcaster is the
/// caller's job.
#[derive(Debug)]
pub struct InstructionPlan {
    pub instructions: Vec<Instruction>,
    pub signers: Vec<Keypair>,
    /// The identity of the position this plan creates or mutates.
    pub position_id: Option<Pubkey>,
}

impl InstructionPlan {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            signers: Vec::new(),
            position_id: None,
        }
    }

    pub fn with_signer(mut self, signer: Keypair) -> Self {
        self.signers.push(signer);
        self
    }

    pub fn with_position_id(mut self, id: Pubkey) -> Self {
        self.position_id = Some(id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_snapshot_serializes_pubkeys_as_base58() {
        let pool = PoolSnapshot {
            address: Pubkey::new_unique(),
            protocol: ProtocolKind::Bin,
            token_a: Token {
                mint: Pubkey::new_unique(),
                decimals: 9,
            },
            token_b: Token {
                mint: Pubkey::new_unique(),
                decimals: 6,
            },
            price: Decimal::new(12345, 2),
            step: 25,
            current_unit: 100,
            liquidity: 0,
            rewards: vec![],
        };
        let json = serde_json::to_value(&pool).unwrap();
        assert_eq!(json["protocol"], "bin");
        assert_eq!(
            json["address"].as_str().unwrap(),
            pool.address.to_string()
        );
        let back: PoolSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back.address, pool.address);
        assert_eq!(back.price, pool.price);
    }
}
