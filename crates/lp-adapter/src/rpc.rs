//! Read-side collaborator interface.
//!
//! The adapter never talks to the network directly: every account read goes
//! through [`AccountReader`], so callers can inject an RPC client, a cached
//! snapshot store, or an in-memory fixture. Signing and broadcast stay on
//! the caller's side of the boundary entirely.

use async_trait::async_trait;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp as RpcMemcmp, RpcFilterType},
    rpc_request::TokenAccountsFilter,
};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

use crate::error::Result;

/// A raw account snapshot: the owning program plus the data blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAccount {
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

/// Filters accepted by [`AccountReader::program_accounts_by_filter`],
/// mirroring the RPC `getProgramAccounts` filter set.
#[derive(Debug, Clone)]
pub enum AccountFilter {
    DataSize(u64),
    Memcmp { offset: usize, bytes: Vec<u8> },
}

impl AccountFilter {
    pub fn memcmp(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Memcmp {
            offset,
            bytes: bytes.into(),
        }
    }

    /// Does a raw data blob match this filter? Used by in-memory readers.
    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            Self::DataSize(size) => data.len() as u64 == *size,
            Self::Memcmp { offset, bytes } => data
                .get(*offset..*offset + bytes.len())
                .is_some_and(|window| window == bytes.as_slice()),
        }
    }
}

/// Read access to ledger state. `None` means the account genuinely does not
/// exist; transport failures surface as errors and are the caller's to
/// retry, never this crate's.
#[async_trait]
pub trait AccountReader: Send + Sync {
    async fn read_account(&self, address: &Pubkey) -> Result<Option<RawAccount>>;

    async fn program_accounts_by_filter(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, RawAccount)>>;

    /// All token accounts of `owner` under the given token program.
    async fn token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        token_program: &Pubkey,
    ) -> Result<Vec<(Pubkey, RawAccount)>>;
}

#[async_trait]
impl AccountReader for RpcClient {
    async fn read_account(&self, address: &Pubkey) -> Result<Option<RawAccount>> {
        let response = self
            .get_account_with_commitment(address, CommitmentConfig::confirmed())
            .await?;
        Ok(response.value.map(|account| RawAccount {
            owner: account.owner,
            data: account.data,
        }))
    }

    async fn program_accounts_by_filter(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, RawAccount)>> {
        let rpc_filters = filters
            .iter()
            .map(|filter| match filter {
                AccountFilter::DataSize(size) => RpcFilterType::DataSize(*size),
                AccountFilter::Memcmp { offset, bytes } => {
                    RpcFilterType::Memcmp(RpcMemcmp::new_raw_bytes(*offset, bytes.clone()))
                }
            })
            .collect();

        let config = RpcProgramAccountsConfig {
            filters: Some(rpc_filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(solana_account_decoder::UiAccountEncoding::Base64),
                commitment: Some(CommitmentConfig::confirmed()),
                ..Default::default()
            },
            ..Default::default()
        };

        let accounts = self
            .get_program_accounts_with_config(program_id, config)
            .await?;
        Ok(accounts
            .into_iter()
            .map(|(address, account)| {
                (
                    address,
                    RawAccount {
                        owner: account.owner,
                        data: account.data,
                    },
                )
            })
            .collect())
    }

    async fn token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        token_program: &Pubkey,
    ) -> Result<Vec<(Pubkey, RawAccount)>> {
        // The indexed RPC call returns jsonParsed data; re-fetch raw bytes in
        // one batch instead of decoding the parsed form.
        let keyed = self
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(*token_program))
            .await?;
        let addresses: Vec<Pubkey> = keyed
            .iter()
            .filter_map(|keyed| keyed.pubkey.parse().ok())
            .collect();
        if addresses.is_empty() {
            return Ok(Vec::new());
        }

        let accounts = self.get_multiple_accounts(&addresses).await?;
        Ok(addresses
            .into_iter()
            .zip(accounts)
            .filter_map(|(address, account)| {
                account.map(|account| {
                    (
                        address,
                        RawAccount {
                            owner: account.owner,
                            data: account.data,
                        },
                    )
                })
            })
            .collect())
    }
}

/// Fields of an SPL token account this crate cares about. Both token
/// programs share this 165-byte prefix.
#[derive(Debug, Clone, Copy)]
pub struct TokenAccountView {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}

impl TokenAccountView {
    pub fn read(data: &[u8]) -> Option<Self> {
        if data.len() < 72 {
            return None;
        }
        Some(Self {
            mint: Pubkey::try_from(&data[0..32]).ok()?,
            owner: Pubkey::try_from(&data[32..64]).ok()?,
            amount: u64::from_le_bytes(data[64..72].try_into().ok()?),
        })
    }
}

/// Decimals live at offset 44 of a mint account, under either token program.
pub fn mint_decimals(data: &[u8]) -> Option<u8> {
    data.get(44).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memcmp_filter_matches_windows() {
        let filter = AccountFilter::memcmp(2, vec![3u8, 4]);
        assert!(filter.matches(&[1, 2, 3, 4, 5]));
        assert!(!filter.matches(&[1, 2, 3]));
        assert!(!filter.matches(&[3, 4, 0, 0]));
        assert!(AccountFilter::DataSize(3).matches(&[0; 3]));
    }

    #[test]
    fn token_account_view_reads_prefix() {
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut data = vec![0u8; 165];
        data[0..32].copy_from_slice(mint.as_ref());
        data[32..64].copy_from_slice(owner.as_ref());
        data[64..72].copy_from_slice(&1u64.to_le_bytes());
        let view = TokenAccountView::read(&data).unwrap();
        assert_eq!(view.mint, mint);
        assert_eq!(view.owner, owner);
        assert_eq!(view.amount, 1);
        assert!(TokenAccountView::read(&data[..40]).is_none());
    }
}
