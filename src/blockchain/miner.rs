use log::trace;
use rand::Rng;
use serde::Serialize;

use super::block::Block;
use super::hash::Hash;
use crate::error::{LedgerError, Result};

/// A successful proof-of-work search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MinedNonce {
    pub nonce: u64,
    pub hash: Hash,
    /// Attempts spent, the successful one included.
    pub attempts: u64,
}

/// Retry `try_mine` against `parent` until an attempt meets `difficulty`.
/// With `max_attempts` set, gives up with `MiningExhausted` once the cap
/// is spent.
pub fn mine<R: Rng + ?Sized>(
    parent: &Block,
    difficulty: u32,
    rng: &mut R,
    max_attempts: Option<u64>,
) -> Result<MinedNonce> {
    let mut attempts: u64 = 0;
    loop {
        if max_attempts.is_some_and(|cap| attempts >= cap) {
            return Err(LedgerError::MiningExhausted { attempts });
        }
        attempts += 1;

        let attempt = parent.try_mine(difficulty, rng);
        match attempt.hash {
            Some(hash) => {
                return Ok(MinedNonce {
                    nonce: attempt.nonce,
                    hash,
                    attempts,
                });
            }
            None => trace!("attempt #{} failed for nonce {}", attempts, attempt.nonce),
        }
    }
}
