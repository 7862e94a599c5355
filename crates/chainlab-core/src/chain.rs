use tracing::debug;

use crate::block::Block;
use crate::clock::{Clock, SystemClock};
use crate::constants::{GENESIS_PREVIOUS_HASH, INITIAL_DIFFICULTY, MINING_REWARD};
use crate::error::{ChainError, Result};
use crate::mine::mine_block;
use crate::transaction::Transaction;

/// A zero-transaction genesis block with the fixed previous-hash sentinel.
pub fn genesis_block(clock: &dyn Clock) -> Block {
    Block::with_clock(0, GENESIS_PREVIOUS_HASH, Vec::new(), clock)
}

/// The ledger controller: owns the block sequence and the pending queue,
/// admits transactions, mines blocks and answers balance and validity
/// queries.
///
/// Single-threaded by contract: mining is a blocking call and nothing outside
/// the chain holds a writable handle into its storage.
pub struct Chain {
    blocks: Vec<Block>,
    pending: Vec<Transaction>,
    difficulty: usize,
    mining_reward: f64,
    clock: Box<dyn Clock>,
}

impl Chain {
    /// A chain holding only the genesis block.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Same as [`Chain::new`] with an explicit time source.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        let clock: Box<dyn Clock> = Box::new(clock);
        let genesis = genesis_block(&*clock);
        Self {
            blocks: vec![genesis],
            pending: Vec::new(),
            difficulty: INITIAL_DIFFICULTY,
            mining_reward: MINING_REWARD,
            clock,
        }
    }

    /// Queues a transfer for the next mined block and returns the index it is
    /// expected to land at. The index is a forward-looking estimate, not a
    /// commitment.
    ///
    /// Reward-sender transactions are accepted unconditionally; everything
    /// else must pass its own validity check.
    pub fn submit_transaction(&mut self, tx: Transaction) -> Result<u64> {
        if !tx.is_reward() && !tx.is_valid() {
            return Err(ChainError::InvalidTransaction(tx.hash().to_string()));
        }
        let next_index = self.tip()?.index() + 1;
        debug!("queued transaction {} -> {}", tx.from(), tx.to());
        self.pending.push(tx);
        Ok(next_index)
    }

    /// Seals the pending queue plus one reward transaction into a new block,
    /// runs the proof-of-work search and appends the result to the chain.
    ///
    /// On success the chain grows by exactly one block and the queue is
    /// cleared; on failure nothing is mutated.
    pub fn mine_pending(&mut self, reward_address: &str) -> Result<()> {
        if reward_address.is_empty() {
            return Err(ChainError::MissingRewardAddress);
        }

        let mut batch = self.pending.clone();
        batch.push(Transaction::reward(
            reward_address,
            self.mining_reward,
            &*self.clock,
        )?);

        let tip = self.tip()?;
        let block = Block::with_clock(tip.index() + 1, tip.hash(), batch, &*self.clock);
        let mined = mine_block(block, self.difficulty);

        self.blocks.push(mined);
        self.pending.clear();
        Ok(())
    }

    /// Net balance for `address`: credits where it is the receiver, debits
    /// where it is the sender. An address the chain has never seen nets 0.
    ///
    /// Scans the full chain on every call; the ledger keeps no balance index,
    /// the chain itself is the single source of truth.
    pub fn balance_of(&self, address: &str) -> f64 {
        let mut balance = 0.0;
        for block in &self.blocks {
            for tx in block.transactions() {
                if tx.to() == address {
                    balance += tx.amount();
                }
                if tx.from() == address {
                    balance -= tx.amount();
                }
            }
        }
        balance
    }

    /// Replays every digest, linkage and index check across the whole chain.
    /// Short-circuits on the first failure.
    pub fn is_valid(&self) -> bool {
        let Some(genesis) = self.blocks.first() else {
            return false;
        };
        if genesis.index() != 0
            || genesis.previous_hash() != GENESIS_PREVIOUS_HASH
            || !genesis.transactions().is_empty()
            || genesis.hash() != genesis.compute_hash()
        {
            return false;
        }
        self.blocks.windows(2).all(|pair| {
            let (prev, block) = (&pair[0], &pair[1]);
            block.is_valid()
                && block.previous_hash() == prev.hash()
                && block.index() == prev.index() + 1
        })
    }

    /// The most recently mined block.
    pub fn tip(&self) -> Result<&Block> {
        self.blocks.last().ok_or(ChainError::EmptyChain)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// Number of blocks in the chain, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn mining_reward(&self) -> f64 {
        self.mining_reward
    }

    /// Mutable handle into a stored block. Fault-injection hook for tamper
    /// tests; not part of the production surface.
    #[cfg(any(test, feature = "testing"))]
    pub fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}
