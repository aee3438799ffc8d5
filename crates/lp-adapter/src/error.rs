use std::error::Error as StdError;
use std::result::Result as StdResult;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error as ThisError;

pub type BoxedError = Box<dyn StdError + Send + Sync>;

pub type Result<T> = StdResult<T, Error>;

/// Why a raw account buffer could not be decoded into a typed record.
#[derive(Debug, ThisError)]
pub enum DecodeError {
    #[error("account data too short: need at least {need} bytes, got {got}")]
    TooShort { need: usize, got: usize },
    #[error("wrong discriminator for {record}: expected {expected:02x?}, found {found:02x?}")]
    WrongDiscriminator {
        record: &'static str,
        expected: [u8; 8],
        found: [u8; 8],
    },
    #[error("invalid {record}: {field} = {value} violates {constraint}")]
    InvalidRecord {
        record: &'static str,
        field: &'static str,
        value: String,
        constraint: String,
    },
}

/// Why a caller-supplied price range could not be resolved.
#[derive(Debug, ThisError)]
pub enum RangeError {
    #[error("{unit} {value} outside protocol bounds [{min}, {max}]")]
    OutOfBounds {
        unit: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("lower bound {lower} greater than upper bound {upper}")]
    LowerGreaterThanUpper { lower: String, upper: String },
    #[error("range mode {0} is not supported by this protocol")]
    UnsupportedRangeMode(&'static str),
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Any(#[from] anyhow::Error),
    #[error(transparent)]
    SolanaClient(#[from] solana_client::client_error::ClientError),
    #[error(transparent)]
    SolanaProgram(#[from] solana_sdk::program_error::ProgramError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error("borsh serialization failed: {0}")]
    Borsh(#[from] std::io::Error),
    #[error("address derivation exhausted for {schema} under program {program_id}")]
    AddressDerivationExhausted {
        schema: &'static str,
        program_id: Pubkey,
    },
    #[error("account not found: {0}")]
    AccountNotFound(Pubkey),
    #[error("account {address} is owned by {owner}, expected {expected}")]
    UnexpectedAccountOwner {
        address: Pubkey,
        owner: Pubkey,
        expected: Pubkey,
    },
    #[error("no instruction variant supports this pool configuration: {0}")]
    UnsupportedInstructionVariant(String),
    #[error("position not found: {0}")]
    PositionNotFound(Pubkey),
    #[error("pool {0} does not match any supported protocol")]
    UnknownProtocol(Pubkey),
    #[error("amount conversion failed: {0}")]
    AmountConversion(String),
}

impl Error {
    pub fn custom<E: Into<anyhow::Error>>(e: E) -> Self {
        Error::Any(e.into())
    }
}
