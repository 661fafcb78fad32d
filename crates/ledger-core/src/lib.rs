//! Single-node ledger engine: signed transfers, proof-of-work sealed blocks,
//! a derived balance map and retroactive chain verification.

pub mod block;
pub mod chain;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod pow;
pub mod transaction;

use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

pub use block::{Block, BlockHeader, CandidateBlock};
pub use chain::{
    apply_transaction, find_violation, IntegrityViolation, Ledger, ViolationKind, WorldState,
};
pub use config::{LedgerConfig, MiningMode};
pub use crypto::{generate_key_pair, EcdsaVerifier, KeyPair, Signer, Verifier};
pub use error::{LedgerError, Result};
pub use pow::Seal;
pub use transaction::Transaction;

pub type Hash = [u8; 32];

pub fn sha256(text: &str) -> Hash {
    Sha256::digest(text.as_bytes()).into()
}

/// Lowercase hex SHA-256 of `text`. Every hash recorded on the chain is one of these.
pub fn sha256_hex(text: &str) -> String {
    hex::encode(sha256(text))
}

/// Left fold over the block's transactions: seed `""`, step `H(acc ++ amount ++ to ++ from)`.
pub fn transaction_root(txs: &[Transaction]) -> String {
    txs.iter().fold(String::new(), |acc, tx| {
        sha256_hex(&format!("{acc}{}{}{}", tx.amount, tx.to, tx.from))
    })
}

/// Milliseconds since the Unix epoch, zero if the clock is before it.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}
