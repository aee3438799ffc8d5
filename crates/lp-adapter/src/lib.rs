//! Multi-protocol adapter for concentrated-liquidity positions on Solana.
//!
//! Supports two AMM families on one codebase: the tick-based Raydium CLMM
//! and the bin-based Meteora DLMM. The crate decodes on-chain pool and
//! position accounts, derives every program-owned sub-account address,
//! converts between prices and discretized units without floating-point
//! drift where the protocol demands it, and assembles the ordered
//! instruction lists for the full position lifecycle (open, add, remove,
//! claim, close).
//!
//! What this crate deliberately does NOT do: sign, broadcast, retry, or
//! query prices. Reads go through the [`rpc::AccountReader`] collaborator;
//! the output of every operation is a [`types::InstructionPlan`] for the
//! caller's signer.
//!
//! ```no_run
//! use lp_adapter::prelude::*;
//! use solana_client::nonblocking::rpc_client::RpcClient;
//!
//! # async fn demo() -> lp_adapter::Result<()> {
//! let rpc = RpcClient::new("https://api.mainnet-beta.solana.com".into());
//! let mut manager = PositionManager::new(rpc);
//!
//! let pool: Pubkey = "8sLbNZoA1cfnvMJLPfp98ZLAnFSYCFApfJKMbiXNLwxj".parse().unwrap();
//! let owner = Pubkey::new_unique();
//! let plan = manager
//!     .open(
//!         &pool,
//!         &PriceRange::percent(rust_decimal::Decimal::new(1, 2)),
//!         rust_decimal::Decimal::ONE,
//!         rust_decimal::Decimal::from(150),
//!         &owner,
//!         None,
//!     )
//!     .await?;
//! // hand plan.instructions + plan.signers to your signer/broadcaster
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod anchor;
pub mod cache;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod meteora_dlmm;
pub mod pda;
pub mod range;
pub mod raydium_clmm;
pub mod rpc;
pub mod types;
pub mod utils;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::config::AdapterConfig;
    pub use crate::error::{Error, Result};
    pub use crate::lifecycle::PositionManager;
    pub use crate::range::PriceRange;
    pub use crate::rpc::{AccountFilter, AccountReader, RawAccount};
    pub use crate::types::{
        InstructionPlan, PoolSnapshot, PositionSnapshot, ProtocolKind, Token,
    };
    pub use solana_sdk::pubkey::Pubkey;
}
