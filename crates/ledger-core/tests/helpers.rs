#![allow(dead_code)]

use ledger_core::{KeyPair, Ledger, LedgerConfig, MiningMode, Signer, Transaction};

pub const REWARD: u64 = 100;

pub fn test_config() -> LedgerConfig {
    LedgerConfig {
        difficulty: 1,
        mining_reward: REWARD,
        mining: MiningMode::Sequential,
    }
}

pub fn open_ledger() -> Ledger {
    Ledger::new(test_config()).expect("valid test config")
}

pub fn signed_transfer(amount: u64, from: &KeyPair, to: &str) -> Transaction {
    let mut tx = Transaction::new(amount, from.public_id(), to);
    tx.sign(from).expect("owner signs own transfer");
    tx
}

/// Ledger where each of the given keys has been paid one mining reward.
pub fn funded_ledger(keys: &[&KeyPair]) -> Ledger {
    let mut ledger = open_ledger();
    for key in keys {
        ledger.mine_round(&key.public_id()).expect("mining round");
    }
    ledger
}
