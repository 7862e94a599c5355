use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::clock::{Clock, SystemClock};
use crate::constants::FIELD_SEPARATOR;
use crate::transaction::Transaction;

/// Capability for payloads that can vouch for their own integrity.
///
/// The default body reports valid, so plain records without a digest of their
/// own pass block-level validation untouched; the block digest still covers
/// their serialized bytes.
pub trait Verifiable {
    fn is_valid(&self) -> bool {
        true
    }
}

/// One sealed batch of transactions, linked to its predecessor by digest
/// value rather than by reference: validation is a pure digest comparison,
/// never a shared-state check.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block<T = Transaction> {
    index: u64,
    timestamp: u64,
    transactions: Vec<T>,
    previous_hash: String,
    hash: String,
    nonce: u64,
}

impl<T> Block<T>
where
    T: Verifiable + Serialize + Clone,
{
    /// Seals `transactions` into a block stamped with the system clock.
    /// The nonce starts at 0 and the digest is computed immediately.
    pub fn new(index: u64, previous_hash: impl Into<String>, transactions: Vec<T>) -> Self {
        Self::with_clock(index, previous_hash, transactions, &SystemClock)
    }

    /// Same as [`Block::new`] with an explicit time source.
    pub fn with_clock(
        index: u64,
        previous_hash: impl Into<String>,
        transactions: Vec<T>,
        clock: &dyn Clock,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp: clock.now_millis(),
            transactions,
            previous_hash: previous_hash.into(),
            hash: String::new(),
            nonce: 0,
        };
        block.hash = block.compute_hash();
        block
    }

    /// SHA-256 over the header fields and the JSON form of the transaction
    /// sequence, as lowercase hex. The serialization is order-preserving and
    /// field-complete: reordering or dropping any transaction changes the
    /// digest.
    pub fn compute_hash(&self) -> String {
        let transactions = serde_json::to_string(&self.transactions)
            .expect("transaction sequence serializes to JSON");
        let index = self.index.to_string();
        let timestamp = self.timestamp.to_string();
        let nonce = self.nonce.to_string();
        let mut hasher = Sha256::new();
        for field in [
            index.as_str(),
            &self.previous_hash,
            &timestamp,
            &transactions,
            &nonce,
        ] {
            hasher.update(field.as_bytes());
            hasher.update([FIELD_SEPARATOR]);
        }
        hex::encode(hasher.finalize())
    }

    /// Digest self-consistency, then every payload's own check.
    pub fn is_valid(&self) -> bool {
        self.hash == self.compute_hash() && self.transactions.iter().all(|tx| tx.is_valid())
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn transactions(&self) -> &[T] {
        &self.transactions
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Replaces the nonce and refreshes the digest. This is the mining
    /// search's legitimate mutation path.
    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
        self.hash = self.compute_hash();
    }

    /// Stores a new owned transaction sequence WITHOUT refreshing the digest.
    ///
    /// Fault-injection path: a block whose contents were swapped this way
    /// stops validating. The chain never calls it.
    pub fn set_transactions(&mut self, transactions: Vec<T>) {
        self.transactions = transactions;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::constants::HASH_HEX_SIZE;

    const T0: u64 = 1_600_000_000_000;

    fn transfers(clock: &dyn Clock) -> Vec<Transaction> {
        vec![
            Transaction::with_clock("alice", "bob", 10.0, clock).unwrap(),
            Transaction::with_clock("bob", "charlie", 5.0, clock).unwrap(),
        ]
    }

    #[test]
    fn digest_is_computed_at_construction() {
        let clock = FixedClock(T0);
        let block = Block::with_clock(1, "0".repeat(HASH_HEX_SIZE), transfers(&clock), &clock);
        assert_eq!(block.hash(), block.compute_hash());
        assert_eq!(block.hash().len(), HASH_HEX_SIZE);
        assert_eq!(block.nonce(), 0);
        assert!(block.is_valid());
    }

    #[test]
    fn digest_changes_with_nonce() {
        let clock = FixedClock(T0);
        let mut block = Block::with_clock(1, "0", transfers(&clock), &clock);
        let before = block.hash().to_string();
        block.set_nonce(block.nonce() + 1);
        assert_ne!(block.hash(), before);
        // a refreshed digest is consistent, not tampered
        assert!(block.is_valid());
    }

    #[test]
    fn reordering_the_batch_breaks_the_digest() {
        let clock = FixedClock(T0);
        let txs = transfers(&clock);
        let mut block = Block::with_clock(1, "0", txs.clone(), &clock);
        assert!(block.is_valid());

        let mut reversed = txs;
        reversed.reverse();
        block.set_transactions(reversed);
        assert!(!block.is_valid());
    }

    #[test]
    fn swapping_the_batch_breaks_the_digest() {
        let clock = FixedClock(T0);
        let mut block = Block::with_clock(1, "0", transfers(&clock), &clock);
        block.set_transactions(vec![Transaction::with_clock(
            "mallory",
            "mallory",
            1_000_000.0,
            &clock,
        )
        .unwrap()]);
        assert!(!block.is_valid());
    }

    #[test]
    fn a_corrupt_transaction_invalidates_the_block() {
        let clock = FixedClock(T0);
        let mut tx = Transaction::with_clock("alice", "bob", 10.0, &clock).unwrap();
        tx.corrupt_amount();
        // the block digest covers the corrupted bytes, so it is consistent;
        // the recursive payload check is what catches the tamper
        let block = Block::with_clock(1, "0", vec![tx], &clock);
        assert_eq!(block.hash(), block.compute_hash());
        assert!(!block.is_valid());
    }

    #[test]
    fn payloads_without_their_own_check_are_trivially_valid() {
        #[derive(Clone, Serialize)]
        struct Note {
            text: String,
        }
        impl Verifiable for Note {}

        let clock = FixedClock(T0);
        let notes = vec![Note {
            text: "hello".into(),
        }];
        let mut block = Block::with_clock(1, "0", notes, &clock);
        assert!(block.is_valid());

        // structural tamper detection still covers them through the digest
        block.set_transactions(vec![Note {
            text: "rewritten".into(),
        }]);
        assert!(!block.is_valid());
    }
}
