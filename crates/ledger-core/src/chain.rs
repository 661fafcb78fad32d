//! The ledger: chain of sealed blocks, pending pool and the derived world state.
//!
//! Blocks are accepted without checks at append time. Tampering is only
//! found afterwards by [`Ledger::verify`].

use crate::block::{Block, CandidateBlock};
use crate::config::LedgerConfig;
use crate::crypto::{EcdsaVerifier, Verifier};
use crate::error::{LedgerError, Result};
use crate::{now_millis, Transaction};
use rayon::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

pub type WorldState = HashMap<String, u64>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    /// Stored hash no longer matches the block contents.
    HashMismatch,
    /// `previous_hash` does not point at the preceding block.
    BrokenLink,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::HashMismatch => write!(f, "stored hash does not match contents"),
            ViolationKind::BrokenLink => write!(f, "previous hash does not link to parent"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("integrity violation at block {index}: {kind}")]
pub struct IntegrityViolation {
    pub index: usize,
    pub kind: ViolationKind,
}

/// Balance state-transition for one transaction.
///
/// Coinbase always credits `to`. A transfer moves funds only when `from` holds
/// at least `amount`; otherwise nothing changes. Returns whether balances moved.
pub fn apply_transaction(state: &mut WorldState, tx: &Transaction) -> bool {
    if tx.is_coinbase() {
        credit(state, &tx.to, tx.amount);
        info!(to = %tx.to, amount = tx.amount, "coins created");
        return true;
    }
    match state.get_mut(&tx.from) {
        Some(balance) if *balance >= tx.amount => *balance -= tx.amount,
        _ => {
            debug!(
                from = %tx.from,
                to = %tx.to,
                amount = tx.amount,
                "transfer has no effect: sender balance too low"
            );
            return false;
        }
    }
    credit(state, &tx.to, tx.amount);
    true
}

fn credit(state: &mut WorldState, to: &str, amount: u64) {
    let balance = state.entry(to.to_string()).or_insert(0);
    *balance = balance.saturating_add(amount);
}

/// First block after genesis whose stored hash or parent link does not hold.
/// Index 0 is never checked.
pub fn find_violation(blocks: &[Block]) -> Option<IntegrityViolation> {
    blocks.windows(2).enumerate().find_map(|(i, pair)| {
        let (parent, block) = (&pair[0], &pair[1]);
        let kind = if block.compute_hash() != block.hash {
            ViolationKind::HashMismatch
        } else if block.previous_hash != parent.hash {
            ViolationKind::BrokenLink
        } else {
            return None;
        };
        Some(IntegrityViolation { index: i + 1, kind })
    })
}

pub struct Ledger<V: Verifier = EcdsaVerifier> {
    blocks: Vec<Block>,
    pending: VecDeque<Transaction>,
    world_state: WorldState,
    config: LedgerConfig,
    verifier: V,
}

impl Ledger<EcdsaVerifier> {
    pub fn new(config: LedgerConfig) -> Result<Self> {
        Self::with_verifier(config, EcdsaVerifier)
    }
}

impl<V: Verifier> Ledger<V> {
    pub fn with_verifier(config: LedgerConfig, verifier: V) -> Result<Self> {
        config.validate()?;
        let genesis = Block::genesis(now_millis());
        info!(hash = %genesis.hash, "genesis block created");
        Ok(Self {
            blocks: vec![genesis],
            pending: VecDeque::new(),
            world_state: WorldState::new(),
            config,
            verifier,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always `false`: the genesis block exists from construction on.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn tip(&self) -> &Block {
        // the chain is created with a genesis block and never shrinks
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn get_block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Transaction> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn world_state(&self) -> &WorldState {
        &self.world_state
    }

    pub fn balance(&self, address: &str) -> Option<u64> {
        self.world_state.get(address).copied()
    }

    /// Queues a transaction. Nothing is checked until the next mining round.
    pub fn submit(&mut self, tx: Transaction) {
        debug!(hash = %tx.compute_hash(), amount = tx.amount, "transaction submitted");
        self.pending.push_back(tx);
    }

    /// Acceptance check used when selecting pending transactions.
    ///
    /// A coinbase is accepted iff it pays exactly the mining reward. A transfer
    /// needs a recipient, a recipient balance strictly above `amount`, and a
    /// valid signature. The balance rule looks at `to`, not `from`, which
    /// differs from [`apply_transaction`]; both rules are kept as they are.
    pub fn validate(&self, tx: &Transaction) -> Result<bool> {
        if tx.is_coinbase() {
            return Ok(tx.amount == self.config.mining_reward);
        }
        if tx.to.is_empty() {
            return Err(LedgerError::MalformedTransaction(format!(
                "transfer {} has an empty recipient",
                tx.compute_hash()
            )));
        }
        let recipient_covers = self
            .world_state
            .get(&tx.to)
            .is_some_and(|balance| *balance > tx.amount);
        Ok(recipient_covers && tx.is_signature_valid(&self.verifier))
    }

    /// Mines one block from the pending pool plus a coinbase paying
    /// `reward_address`, appends it, and empties the pool.
    ///
    /// Rejected and malformed transactions are dropped, not retried.
    pub fn mine_round(&mut self, reward_address: &str) -> Result<&Block> {
        let timestamp = now_millis();
        let pending: Vec<Transaction> = self.pending.drain(..).collect();

        // validation is read-only against the current state, so the pool can be
        // checked in parallel and consumed in FIFO order afterwards
        let verdicts: Vec<Result<bool>> =
            pending.par_iter().map(|tx| self.validate(tx)).collect();

        let mut included = Vec::with_capacity(pending.len() + 1);
        for (tx, verdict) in pending.into_iter().zip(verdicts) {
            match verdict {
                Ok(true) => included.push(tx),
                Ok(false) => {
                    debug!(hash = %tx.compute_hash(), "pending transaction rejected")
                }
                Err(err) => warn!(%err, "dropping malformed transaction"),
            }
        }
        included.push(Transaction::coinbase(
            self.config.mining_reward,
            reward_address,
        ));

        let candidate = CandidateBlock::new(timestamp, included, self.config.difficulty);
        self.append(candidate)
    }

    /// Links the candidate to the tip, mines it at its own difficulty, applies
    /// every transaction in order and pushes the sealed block. Signatures are
    /// not re-checked here. A candidate whose difficulty no hash can meet is
    /// refused and the chain is left unchanged.
    pub fn append(&mut self, mut candidate: CandidateBlock) -> Result<&Block> {
        candidate.previous_hash = self.tip().hash.clone();
        let block = candidate.mine(self.config.mining)?;

        let mut effective = 0usize;
        for tx in &block.transactions {
            if apply_transaction(&mut self.world_state, tx) {
                effective += 1;
            }
        }

        info!(
            height = self.blocks.len(),
            hash = %block.hash,
            nonce = block.nonce,
            txs = block.transactions.len(),
            effective,
            "block mined"
        );
        self.blocks.push(block);
        Ok(self.tip())
    }

    pub fn find_violation(&self) -> Option<IntegrityViolation> {
        find_violation(&self.blocks)
    }

    /// Full scan of the chain. The genesis block is always considered valid.
    pub fn verify(&self) -> bool {
        match self.find_violation() {
            None => true,
            Some(violation) => {
                warn!(index = violation.index, kind = ?violation.kind, "{violation}");
                false
            }
        }
    }
}
