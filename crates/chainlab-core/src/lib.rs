//! A single-process, append-only ledger of hash-linked blocks.
//!
//! Transactions carry their own SHA-256 digest, blocks seal an ordered batch
//! of transactions behind a proof-of-work digest, and [`Chain`] strings the
//! blocks together so that tampering anywhere in history is caught by
//! replaying the digest checks.
//!
//! This is a pedagogical, in-process simulation: there is no networking, no
//! persistence and no signature scheme. Mining is a blocking, sequential
//! nonce search whose cost is set by the chain's difficulty.

pub mod block;
pub mod chain;
pub mod clock;
pub mod constants;
pub mod error;
pub mod mine;
pub mod transaction;

pub use block::{Block, Verifiable};
pub use chain::{genesis_block, Chain};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ChainError, Result};
pub use transaction::Transaction;
