use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::blockchain::{Block, BlockKind, Blockchain, Hash, SystemClock};
use crate::config::Config;
use crate::error::LedgerError;
use crate::session::Session;
use crate::transaction::Transaction;

/// Shared application state: one simulation session behind a mutex.
pub struct AppState {
    pub session: Mutex<Session>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            session: Mutex::new(Session::new(config, SystemClock)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/* ---------- Chain API Models ---------- */

/// Read-only snapshot of a block, addressed by its id.
#[derive(Serialize)]
pub struct BlockView {
    pub id: Hash,
    pub kind: BlockKind,
    pub prev_hash: Hash,
    pub timestamp: i64,
    pub nonce: u64,
    pub miner: String,
    pub weight: u64,
    pub merkle_root: Hash,
    pub children: Vec<Hash>,
}

impl BlockView {
    pub fn build(ledger: &Blockchain, block: &Block) -> Result<Self, LedgerError> {
        let children = ledger.children_of(block)?.iter().map(|c| c.id()).collect();
        Ok(Self {
            id: block.id(),
            kind: block.kind,
            prev_hash: block.prev_hash,
            timestamp: block.timestamp,
            nonce: block.nonce,
            miner: block.miner.clone(),
            weight: block.weight,
            merkle_root: block.merkle_root,
            children,
        })
    }
}

#[derive(Serialize)]
pub struct ChainResponse {
    pub length: usize,
    pub difficulty: u32,
    pub max_weight: u64,
    pub blocks: Vec<BlockView>,
}

#[derive(Serialize)]
pub struct BlockDetailsResponse {
    #[serde(flatten)]
    pub block: BlockView,
    pub transactions: Vec<Transaction>,
    pub verified: bool,
    pub longest_branch_weight: u64,
    pub extendable: bool,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    pub difficulty: u32,
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct LedgerSummary {
    pub length: usize,
    pub difficulty: u32,
    pub max_weight: u64,
    pub undo_depth: usize,
}

#[derive(Serialize)]
pub struct ClearOrphansResponse {
    pub removed: usize,
    #[serde(flatten)]
    pub ledger: LedgerSummary,
}

/* ---------- Mining API Models ---------- */

#[derive(Deserialize, Default)]
pub struct MineRequest {
    #[serde(default)]
    pub miner: Option<String>,
}

#[derive(Serialize)]
pub struct AttemptResponse {
    pub nonce: u64,
    pub hash: Option<Hash>,
    pub success: bool,
    pub difficulty: u32,
}
