use serde::Serialize;
use tracing::info;

use crate::block::{Block, Verifiable};

/// Count of leading `'0'` characters in a hex digest.
pub fn leading_zeros(hash: &str) -> usize {
    hash.bytes().take_while(|b| *b == b'0').count()
}

/// Whether `hash` carries at least `difficulty` leading zero hex characters.
pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    leading_zeros(hash) >= difficulty
}

/// Proof-of-work search: increments the nonce and refreshes the digest until
/// it meets `difficulty`.
///
/// Blocking and strictly sequential, with no suspension points and no
/// cancellation; expected cost grows 16x per difficulty unit since digests
/// are hexadecimal.
pub fn mine_block<T>(mut block: Block<T>, difficulty: usize) -> Block<T>
where
    T: Verifiable + Serialize + Clone,
{
    while !meets_difficulty(block.hash(), difficulty) {
        block.set_nonce(block.nonce() + 1);
    }
    info!(
        "mined block {} with nonce {} and hash {}",
        block.index(),
        block.nonce(),
        block.hash()
    );
    block
}
