/// Sender identifier reserved for system-issued mining rewards.
pub const REWARD_SENDER: &str = "SYSTEM";
/// Previous-hash sentinel carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";
pub const INITIAL_DIFFICULTY: usize = 2;
pub const MINING_REWARD: f64 = 1.0;
/// Largest amount that keeps exact integer precision in an f64 (2^53 - 1).
pub const MAX_AMOUNT: f64 = 9_007_199_254_740_991.0;
pub const SALT_LEN: usize = 16;
pub const HASH_HEX_SIZE: usize = 64;
/// Keeps adjacent fields from running together in a hash preimage.
pub const FIELD_SEPARATOR: u8 = b'|';
