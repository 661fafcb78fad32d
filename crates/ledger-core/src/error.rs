use crate::constants::HASH_HEX_SIZE;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Signing was attempted by a key that does not own the sending identity.
    #[error("signer {signer} is not authorized to sign for sender {from}")]
    Authorization { signer: String, from: String },

    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),

    #[error("invalid key material: {0}")]
    Crypto(String),

    #[error("invalid ledger configuration: {0}")]
    Config(String),

    /// No hash can carry more leading zeros than it has hex characters.
    #[error("difficulty {0} exceeds the {max} hex characters of a hash", max = HASH_HEX_SIZE)]
    UnsatisfiableDifficulty(u32),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
