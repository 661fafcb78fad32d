pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
/// Leading zero hex characters required of a mined block hash.
pub const DEFAULT_DIFFICULTY: u32 = 3;
pub const DEFAULT_MINING_REWARD: u64 = 100;
/// Sender identity marking a coinbase transaction.
pub const COINBASE_SENDER: &str = "";
