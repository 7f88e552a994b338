use thiserror::Error;

use crate::blockchain::hash::Hash;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("block {0} is not part of the ledger")]
    BlockNotFound(Hash),

    #[error("block list must start with the only genesis block")]
    MissingGenesis,

    #[error("block {0} cannot be extended (orphaned or too far behind the heaviest branch)")]
    NotExtendable(Hash),

    #[error("no block found after {attempts} mining attempts")]
    MiningExhausted { attempts: u64 },

    #[error("merkle root of block {0} does not match its transactions")]
    TamperedBlock(Hash),

    #[error("block {0} has no parent in the ledger")]
    DetachedBlock(Hash),

    #[error("genesis block {0} cannot be orphaned")]
    GenesisImmutable(Hash),

    #[error("nothing to undo")]
    NothingToUndo,
}

pub type Result<T> = std::result::Result<T, LedgerError>;
