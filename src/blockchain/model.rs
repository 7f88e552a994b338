use std::collections::VecDeque;

use log::{debug, info};
use rand::Rng;
use serde::Serialize;

use super::block::{Block, BlockKind};
use super::clock::Clock;
use super::hash::Hash;
use super::{DIFFICULTY_INTERVAL, MAX_DIFFICULTY};
use crate::error::{LedgerError, Result};

/// Branchable in-memory ledger. Every mutating operation returns a new value,
/// so older snapshots stay valid.
#[derive(Debug, Clone, Serialize)]
pub struct Blockchain {
    difficulty: u32,
    blocks: Vec<Block>,
}

impl Blockchain {
    /// Initialize a new ledger, bootstrapping genesis by mining a throwaway
    /// payload-free block at the (clamped) difficulty.
    pub fn new<C, R>(difficulty: u32, clock: &C, rng: &mut R) -> Self
    where
        C: Clock + ?Sized,
        R: Rng + ?Sized,
    {
        let difficulty = difficulty.min(MAX_DIFFICULTY);
        let dummy = Block::with_transactions(
            BlockKind::Regular,
            Hash::ZERO,
            clock.now_millis(),
            0,
            "",
            0,
            Vec::new(),
        );

        let mut attempts: u64 = 1;
        let mut attempt = dummy.try_mine(difficulty, rng);
        while !attempt.succeeded() {
            attempt = dummy.try_mine(difficulty, rng);
            attempts += 1;
        }
        debug!(
            "genesis bootstrapped after {} attempts (nonce={}, difficulty={})",
            attempts, attempt.nonce, difficulty
        );

        Self {
            difficulty,
            blocks: vec![Block::genesis(clock.now_millis(), attempt.nonce)],
        }
    }

    /// Rebuild a ledger from an existing block list. `blocks[0]` must be the
    /// only genesis block.
    pub fn from_blocks(difficulty: u32, blocks: Vec<Block>) -> Result<Self> {
        let genesis_at_head = blocks.first().is_some_and(Block::is_genesis);
        let genesis_count = blocks.iter().filter(|b| b.is_genesis()).count();
        if !genesis_at_head || genesis_count != 1 {
            return Err(LedgerError::MissingGenesis);
        }
        Ok(Self::with_blocks(difficulty, blocks))
    }

    fn with_blocks(difficulty: u32, blocks: Vec<Block>) -> Self {
        Self {
            difficulty: difficulty.min(MAX_DIFFICULTY),
            blocks,
        }
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Look a block up by its `Block::id`.
    pub fn find(&self, id: &Hash) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id() == *id)
    }

    fn position(&self, block: &Block) -> Result<usize> {
        let id = block.id();
        self.blocks
            .iter()
            .position(|b| b.id() == id)
            .ok_or(LedgerError::BlockNotFound(id))
    }

    fn child_positions(&self, parent: usize) -> Vec<usize> {
        let parent = &self.blocks[parent];
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, candidate)| parent.is_parent_of(candidate))
            .map(|(i, _)| i)
            .collect()
    }

    /// Every block whose `prev_hash` is `block`'s attempt hash for its nonce.
    pub fn children_of(&self, block: &Block) -> Result<Vec<&Block>> {
        let pos = self.position(block)?;
        Ok(self
            .child_positions(pos)
            .into_iter()
            .map(|i| &self.blocks[i])
            .collect())
    }

    /// Structural parent, `None` for genesis or a block whose parent was cleared.
    pub fn parent_of(&self, block: &Block) -> Result<Option<&Block>> {
        self.position(block)?;
        Ok(self.blocks.iter().find(|p| p.is_parent_of(block)))
    }

    /// Heaviest weight held, orphans included.
    pub fn max_weight(&self) -> u64 {
        self.blocks.iter().map(|b| b.weight).max().unwrap_or(0)
    }

    /// Heaviest leaf weight reachable from `block`, skipping orphaned
    /// descendants. A leaf returns its own weight.
    pub fn longest_branch_weight(&self, block: &Block) -> Result<u64> {
        let start = self.position(block)?;
        Ok(self.branch_weights(&self.children_index())[start])
    }

    /// Child positions of every block, one digest per (parent, candidate) pair.
    fn children_index(&self) -> Vec<Vec<usize>> {
        (0..self.blocks.len())
            .map(|parent| self.child_positions(parent))
            .collect()
    }

    /// Longest live branch weight of every block, each computed once.
    fn branch_weights(&self, children: &[Vec<usize>]) -> Vec<u64> {
        let live = |i: usize| {
            children[i]
                .iter()
                .copied()
                .filter(|&c| !self.blocks[c].is_orphan())
        };
        let mut best: Vec<Option<u64>> = vec![None; self.blocks.len()];
        for root in 0..self.blocks.len() {
            // post-order: a block is settled once all its live children are
            let mut stack = vec![(root, false)];
            while let Some((i, expanded)) = stack.pop() {
                if best[i].is_some() {
                    continue;
                }
                if expanded {
                    let weight = live(i)
                        .filter_map(|c| best[c])
                        .fold(self.blocks[i].weight, u64::max);
                    best[i] = Some(weight);
                } else {
                    stack.push((i, true));
                    stack.extend(live(i).filter(|&c| best[c].is_none()).map(|c| (c, false)));
                }
            }
        }
        best.into_iter()
            .zip(&self.blocks)
            .map(|(w, b)| w.unwrap_or(b.weight))
            .collect()
    }

    /// A block may be mined on when it is live and at most one level behind
    /// the heaviest branch.
    pub fn can_extend(&self, block: &Block) -> Result<bool> {
        let pos = self.position(block)?;
        let block = &self.blocks[pos];
        Ok(!block.is_orphan() && block.weight + 1 >= self.max_weight())
    }

    /// Retag `block` and everything reachable below it as orphans.
    pub fn orphan_block(&self, block: &Block) -> Result<Self> {
        let start = self.position(block)?;
        Ok(self.orphan_from(&[start], &self.children_index()))
    }

    fn orphan_from(&self, starts: &[usize], children: &[Vec<usize>]) -> Self {
        let mut blocks = self.blocks.clone();
        let mut visited = vec![false; blocks.len()];
        let mut queue: VecDeque<usize> = starts.iter().copied().collect();
        let mut orphaned = 0usize;
        while let Some(current) = queue.pop_front() {
            if std::mem::replace(&mut visited[current], true) {
                continue;
            }
            queue.extend(children[current].iter().copied());
            let retagged = blocks[current].clone().retag(BlockKind::Orphan);
            if retagged.kind != blocks[current].kind {
                orphaned += 1;
            }
            blocks[current] = retagged;
        }
        debug!("orphaned {} block(s) from {} root(s)", orphaned, starts.len());
        Self::with_blocks(self.difficulty, blocks)
    }

    /// Drop every block tagged orphan.
    pub fn clear_orphans(&self) -> Self {
        let blocks: Vec<Block> = self
            .blocks
            .iter()
            .filter(|b| !b.is_orphan())
            .cloned()
            .collect();
        debug!("cleared {} orphan(s)", self.blocks.len() - blocks.len());
        Self::with_blocks(self.difficulty, blocks)
    }

    /// Orphan every branch whose heaviest leaf is two or more levels behind
    /// the heaviest block.
    pub fn find_orphans(&self) -> Self {
        let max_weight = self.max_weight();
        let children = self.children_index();
        let weights = self.branch_weights(&children);

        // Everything below a stale block is itself stale, so one pass over
        // the unpruned ledger finds the same roots as pruning one at a time.
        let stale: Vec<usize> = self
            .blocks
            .iter()
            .enumerate()
            .filter(|(pos, b)| {
                !b.is_genesis() && !b.is_orphan() && weights[*pos] + 1 < max_weight
            })
            .map(|(pos, _)| pos)
            .collect();
        if stale.is_empty() {
            return self.clone();
        }
        debug!(
            "pruning {} stale block(s) behind max weight {}",
            stale.len(),
            max_weight
        );
        self.orphan_from(&stale, &children)
    }

    /// Append `block`, raise difficulty every `DIFFICULTY_INTERVAL` weight
    /// levels and prune stale branches.
    pub fn add_block(&self, block: Block) -> Self {
        let mut difficulty = self.difficulty;
        if (self.max_weight() + 1) % DIFFICULTY_INTERVAL == 0 && difficulty < MAX_DIFFICULTY {
            difficulty += 1;
            info!("difficulty raised to {}", difficulty);
        }

        info!(
            "appending block {} (weight={}, nonce={}, miner={})",
            block.id(),
            block.weight,
            block.nonce,
            block.miner
        );
        let mut blocks = Vec::with_capacity(self.blocks.len() + 1);
        blocks.extend(self.blocks.iter().cloned());
        blocks.push(block);

        Self::with_blocks(difficulty, blocks).find_orphans()
    }

    /// Check payload integrity and structural linkage of every block.
    pub fn verify_chain(&self) -> Result<()> {
        for (pos, block) in self.blocks.iter().enumerate() {
            if !block.verify() {
                return Err(LedgerError::TamperedBlock(block.id()));
            }
            if pos == 0 {
                continue;
            }
            if !self.blocks.iter().any(|p| p.is_parent_of(block)) {
                return Err(LedgerError::DetachedBlock(block.id()));
            }
        }
        Ok(())
    }
}
