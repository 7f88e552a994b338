pub mod block;
pub mod clock;
pub mod hash;
pub mod merkle;
pub mod miner;
pub mod model;

pub use block::{Block, BlockKind, MineAttempt};
pub use clock::{Clock, SystemClock};
pub use hash::Hash;
pub use model::Blockchain;

/// Width of every digest, in bits.
pub const HASH_BITS: u32 = 160;

/// Width of every digest, in bytes.
pub const HASH_LEN: usize = (HASH_BITS / 8) as usize;

/// Mining attempts draw nonces from `[0, MAX_NONCE)`.
pub const MAX_NONCE: u64 = 1_000_000;

/// Transactions synthesized per block.
pub const BLOCK_SIZE: usize = 5;

/// Upper bound for difficulty (leading zero bits).
pub const MAX_DIFFICULTY: u32 = 10;

/// Difficulty rises by one every this many weight levels.
pub const DIFFICULTY_INTERVAL: u64 = 5;

/// Difficulty a fresh simulation starts at.
pub const DEFAULT_DIFFICULTY: u32 = 2;

pub const GENESIS_MINER: &str = "genesis";

/// Miner label used when the caller gives none.
pub const DEFAULT_MINER: &str = "unknown";
