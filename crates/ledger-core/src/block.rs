use crate::config::MiningMode;
use crate::error::Result;
use crate::pow::{self, Seal};
use crate::{sha256_hex, transaction_root, Transaction};
use serde::{Deserialize, Serialize};

/// The hashed part of a block. `transaction_root` is carried precomputed so the
/// nonce search only re-hashes a short string per attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub timestamp: u64,
    pub previous_hash: String,
    pub transaction_root: String,
    pub nonce: u64,
}

impl BlockHeader {
    /// `timestamp ++ previous_hash ++ transaction_root`, everything but the nonce.
    pub fn prefix(&self) -> String {
        format!(
            "{}{}{}",
            self.timestamp, self.previous_hash, self.transaction_root
        )
    }

    pub fn hash(&self) -> String {
        hash_with_nonce(&self.prefix(), self.nonce)
    }
}

pub(crate) fn hash_with_nonce(prefix: &str, nonce: u64) -> String {
    sha256_hex(&format!("{prefix}{nonce}"))
}

/// Block fields fixed before the proof-of-work search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateBlock {
    pub timestamp: u64,
    pub previous_hash: String,
    pub transactions: Vec<Transaction>,
    pub difficulty: u32,
}

impl CandidateBlock {
    pub fn new(timestamp: u64, transactions: Vec<Transaction>, difficulty: u32) -> Self {
        Self {
            timestamp,
            previous_hash: String::new(),
            transactions,
            difficulty,
        }
    }

    pub fn header(&self, nonce: u64) -> BlockHeader {
        BlockHeader {
            timestamp: self.timestamp,
            previous_hash: self.previous_hash.clone(),
            transaction_root: transaction_root(&self.transactions),
            nonce,
        }
    }

    /// Fails without searching when `difficulty` can never be met.
    pub fn mine(self, mode: MiningMode) -> Result<Block> {
        let header = self.header(0);
        let seal = match mode {
            MiningMode::Sequential => pow::search(&header, self.difficulty)?,
            MiningMode::Parallel => pow::search_parallel(&header, self.difficulty)?,
        };
        Ok(self.seal(seal))
    }

    /// Assembles the final block. The seal is trusted as given; a seal from
    /// another header produces a block that fails verification.
    pub fn seal(self, seal: Seal) -> Block {
        Block {
            timestamp: self.timestamp,
            previous_hash: self.previous_hash,
            transactions: self.transactions,
            nonce: seal.nonce,
            difficulty: self.difficulty,
            hash: seal.hash,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub timestamp: u64,
    pub previous_hash: String,
    pub transactions: Vec<Transaction>,
    pub nonce: u64,
    pub difficulty: u32,
    pub hash: String,
}

impl Block {
    /// Empty, unlinked and unmined; its hash is simply computed.
    pub fn genesis(timestamp: u64) -> Self {
        let mut block = Block {
            timestamp,
            previous_hash: String::new(),
            transactions: vec![],
            nonce: 0,
            difficulty: 0,
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    pub fn header(&self) -> BlockHeader {
        BlockHeader {
            timestamp: self.timestamp,
            previous_hash: self.previous_hash.clone(),
            transaction_root: transaction_root(&self.transactions),
            nonce: self.nonce,
        }
    }

    /// Recomputes the hash from the current field values. Never touches `self.hash`.
    pub fn compute_hash(&self) -> String {
        self.header().hash()
    }

    pub fn meets_difficulty(&self) -> bool {
        pow::meets_difficulty(&self.hash, self.difficulty)
    }
}
