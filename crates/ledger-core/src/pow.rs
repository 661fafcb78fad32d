//! Proof-of-work nonce search over a fixed block header.
//!
//! All searches start at nonce 0 and return the lowest nonce whose hash has
//! `difficulty` leading `'0'` hex characters, so every strategy agrees on the
//! seal for a given header.

use crate::block::{hash_with_nonce, BlockHeader};
use crate::constants::HASH_HEX_SIZE;
use crate::error::{LedgerError, Result};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

const PARALLEL_CHUNK: u64 = 1 << 16;
const CANCEL_POLL_INTERVAL: u64 = 1 << 10;

/// Winning nonce and the hash it produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seal {
    pub nonce: u64,
    pub hash: String,
}

/// Fails for difficulties no 64-character hash can meet; searching for those
/// would never end.
pub fn check_difficulty(difficulty: u32) -> Result<()> {
    if difficulty as usize > HASH_HEX_SIZE {
        return Err(LedgerError::UnsatisfiableDifficulty(difficulty));
    }
    Ok(())
}

pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let width = difficulty as usize;
    hash.len() >= width && hash.bytes().take(width).all(|b| b == b'0')
}

/// Sequential search. `header.nonce` is ignored.
pub fn search(header: &BlockHeader, difficulty: u32) -> Result<Seal> {
    check_difficulty(difficulty)?;
    let prefix = header.prefix();
    let mut nonce = 0u64;
    loop {
        let hash = hash_with_nonce(&prefix, nonce);
        if meets_difficulty(&hash, difficulty) {
            debug!(nonce, %hash, difficulty, "proof of work found");
            return Ok(Seal { nonce, hash });
        }
        nonce = nonce.wrapping_add(1);
    }
}

/// Parallel search over fixed-size nonce windows. Windows are scanned in
/// order and `find_first` keeps the lowest hit inside a window, so the result
/// is identical to [`search`].
pub fn search_parallel(header: &BlockHeader, difficulty: u32) -> Result<Seal> {
    check_difficulty(difficulty)?;
    let prefix = header.prefix();
    let mut start = 0u64;
    loop {
        let end = start.saturating_add(PARALLEL_CHUNK);
        let found = (start..end)
            .into_par_iter()
            .map(|nonce| (nonce, hash_with_nonce(&prefix, nonce)))
            .find_first(|(_, hash)| meets_difficulty(hash, difficulty));
        if let Some((nonce, hash)) = found {
            debug!(nonce, %hash, difficulty, "proof of work found (parallel)");
            return Ok(Seal { nonce, hash });
        }
        trace!(start, end, "nonce window exhausted");
        start = if end == u64::MAX { 0 } else { end };
    }
}

/// Sequential search that gives up once `cancel` is raised. The flag is polled
/// every few hundred attempts. An unsatisfiable difficulty yields `None` at once.
pub fn search_cancellable(
    header: &BlockHeader,
    difficulty: u32,
    cancel: &AtomicBool,
) -> Option<Seal> {
    check_difficulty(difficulty).ok()?;
    let prefix = header.prefix();
    let mut nonce = 0u64;
    loop {
        if nonce % CANCEL_POLL_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
            debug!(nonce, "proof of work search cancelled");
            return None;
        }
        let hash = hash_with_nonce(&prefix, nonce);
        if meets_difficulty(&hash, difficulty) {
            return Some(Seal { nonce, hash });
        }
        nonce = nonce.wrapping_add(1);
    }
}
