use serde::Serialize;

use crate::blockchain::hash::{Hash, digest};

/// Synthetic payload entry. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// Ordinal within the owning block.
    pub index: u32,
    pub timestamp: i64, // Unix millis (UTC)
    /// Digest of `index` and `timestamp`.
    pub hash: Hash,
}

impl Transaction {
    pub fn new(index: u32, timestamp: i64) -> Self {
        Self {
            index,
            timestamp,
            hash: Self::compute_hash(index, timestamp),
        }
    }

    pub fn compute_hash(index: u32, timestamp: i64) -> Hash {
        digest(format!("{}:{}", index, timestamp))
    }

    /// Build a batch of `count` transactions stamped with `timestamp`.
    pub fn generate(count: usize, timestamp: i64) -> Vec<Self> {
        (0..count as u32)
            .map(|index| Self::new(index, timestamp))
            .collect()
    }
}
