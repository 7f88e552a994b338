use rand::Rng;
use serde::Serialize;

use super::hash::{Hash, digest};
use super::merkle::merkle_root;
use super::{BLOCK_SIZE, GENESIS_MINER, MAX_NONCE};
use crate::transaction::Transaction;

/// Simulation role of a block. Only affects retagging and traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Genesis,
    Regular,
    Orphan,
}

/// Root used for blocks that carry no transactions.
pub const EMPTY_MERKLE_ROOT: Hash = Hash::ZERO;

/// Outcome of a single proof-of-work attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MineAttempt {
    pub nonce: u64,
    /// `None` when the attempt hash missed the difficulty target.
    pub hash: Option<Hash>,
}

impl MineAttempt {
    pub fn succeeded(&self) -> bool {
        self.hash.is_some()
    }
}

/// An immutable block. Parentage is not stored: a block's parent `p` is the
/// one for which `p.attempt_hash(self.nonce) == self.prev_hash`.
#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    pub prev_hash: Hash,
    pub timestamp: i64, // Unix millis (UTC)
    pub nonce: u64,     // nonce this block was mined with
    pub miner: String,
    pub weight: u64, // depth from genesis
    pub transactions: Vec<Transaction>,
    pub merkle_root: Hash, // cached at construction
}

impl Block {
    /// Create a block with a synthetic batch of `BLOCK_SIZE` transactions
    /// stamped with the block's own timestamp.
    pub fn new(
        kind: BlockKind,
        prev_hash: Hash,
        timestamp: i64,
        nonce: u64,
        miner: impl Into<String>,
        weight: u64,
    ) -> Self {
        let transactions = Transaction::generate(BLOCK_SIZE, timestamp);
        Self::with_transactions(kind, prev_hash, timestamp, nonce, miner, weight, transactions)
    }

    /// Create a block carrying the given transactions.
    pub fn with_transactions(
        kind: BlockKind,
        prev_hash: Hash,
        timestamp: i64,
        nonce: u64,
        miner: impl Into<String>,
        weight: u64,
        transactions: Vec<Transaction>,
    ) -> Self {
        let merkle_root = Self::merkle_root_of(&transactions);
        Self {
            kind,
            prev_hash,
            timestamp,
            nonce,
            miner: miner.into(),
            weight,
            transactions,
            merkle_root,
        }
    }

    /// The genesis block: zero `prev_hash`, no payload, weight 0.
    pub fn genesis(timestamp: i64, nonce: u64) -> Self {
        Self::with_transactions(
            BlockKind::Genesis,
            Hash::ZERO,
            timestamp,
            nonce,
            GENESIS_MINER,
            0,
            Vec::new(),
        )
    }

    /// Regular child of a block of `parent_weight`, adopting the hash of a
    /// successful attempt as its `prev_hash`.
    pub fn child(
        parent_weight: u64,
        nonce: u64,
        attempt_hash: Hash,
        miner: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self::new(
            BlockKind::Regular,
            attempt_hash,
            timestamp,
            nonce,
            miner,
            parent_weight + 1,
        )
    }

    fn merkle_root_of(transactions: &[Transaction]) -> Hash {
        let leaves: Vec<Hash> = transactions.iter().map(|tx| tx.hash).collect();
        merkle_root(&leaves).unwrap_or(EMPTY_MERKLE_ROOT)
    }

    /// Recompute the Merkle root from the current transactions.
    pub fn compute_merkle_root(&self) -> Hash {
        Self::merkle_root_of(&self.transactions)
    }

    /// True when the cached Merkle root still matches the payload.
    pub fn verify(&self) -> bool {
        self.merkle_root == self.compute_merkle_root()
    }

    /// The hash a child would adopt as `prev_hash` if mined with `candidate_nonce`.
    pub fn attempt_hash(&self, candidate_nonce: u64) -> Hash {
        let preimage = format!(
            "{}:{}:{}:{}:{}",
            self.prev_hash, self.timestamp, self.nonce, self.merkle_root, candidate_nonce
        );
        digest(preimage)
    }

    /// One proof-of-work attempt with a random nonce in `[0, MAX_NONCE)`.
    /// Does not retry; a miss comes back with `hash: None`.
    pub fn try_mine<R: Rng + ?Sized>(&self, difficulty: u32, rng: &mut R) -> MineAttempt {
        let nonce = rng.gen_range(0..MAX_NONCE);
        let hash = self.attempt_hash(nonce);
        MineAttempt {
            nonce,
            hash: hash.meets_difficulty(difficulty).then_some(hash),
        }
    }

    /// Same block with a different kind. Genesis keeps its kind.
    pub fn retag(self, kind: BlockKind) -> Self {
        if self.is_genesis() {
            return self;
        }
        Self { kind, ..self }
    }

    /// Stable identity across retagging: digest of the identity fields.
    pub fn id(&self) -> Hash {
        let preimage = format!(
            "{}:{}:{}:{}",
            self.prev_hash, self.timestamp, self.nonce, self.merkle_root
        );
        digest(preimage)
    }

    /// Structural parentage check.
    pub fn is_parent_of(&self, child: &Block) -> bool {
        self.attempt_hash(child.nonce) == child.prev_hash
    }

    pub fn is_genesis(&self) -> bool {
        self.kind == BlockKind::Genesis
    }

    pub fn is_orphan(&self) -> bool {
        self.kind == BlockKind::Orphan
    }
}
