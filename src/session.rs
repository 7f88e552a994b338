use std::collections::VecDeque;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::blockchain::miner::{self, MinedNonce};
use crate::blockchain::{Block, Blockchain, Clock, Hash, MineAttempt, SystemClock};
use crate::config::Config;
use crate::error::{LedgerError, Result};

/// Result of a successful `Session::mine_on`.
#[derive(Debug, Clone, Serialize)]
pub struct MiningReport {
    pub id: Hash,
    pub block: Block,
    pub attempts: u64,
    pub difficulty: u32,
    pub difficulty_raised: bool,
}

/// One user's simulation: the current ledger plus undo history and the
/// randomness and clock used to mine.
pub struct Session<C: Clock = SystemClock> {
    ledger: Blockchain,
    history: VecDeque<Blockchain>,
    rng: StdRng,
    clock: C,
    config: Config,
}

impl<C: Clock> Session<C> {
    pub fn new(config: Config, clock: C) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let ledger = Blockchain::new(config.initial_difficulty, &clock, &mut rng);
        Self {
            ledger,
            history: VecDeque::new(),
            rng,
            clock,
            config,
        }
    }

    pub fn ledger(&self) -> &Blockchain {
        &self.ledger
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn block(&self, id: &Hash) -> Result<&Block> {
        self.ledger.find(id).ok_or(LedgerError::BlockNotFound(*id))
    }

    fn commit(&mut self, next: Blockchain) {
        let previous = std::mem::replace(&mut self.ledger, next);
        if self.config.undo_history == 0 {
            return;
        }
        if self.history.len() == self.config.undo_history {
            self.history.pop_front();
        }
        self.history.push_back(previous);
    }

    /// A single proof-of-work attempt against block `id`.
    pub fn attempt(&mut self, id: &Hash) -> Result<MineAttempt> {
        let difficulty = self.ledger.difficulty();
        let block = self.ledger.find(id).ok_or(LedgerError::BlockNotFound(*id))?;
        Ok(block.try_mine(difficulty, &mut self.rng))
    }

    /// Mine a child of block `id` and append it.
    pub fn mine_on(&mut self, id: &Hash, miner: Option<&str>) -> Result<MiningReport> {
        let parent = self.block(id)?.clone();
        if !self.ledger.can_extend(&parent)? {
            warn!("refusing to mine on {} (weight {})", id, parent.weight);
            return Err(LedgerError::NotExtendable(*id));
        }

        let label = miner
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.config.default_miner.as_str())
            .to_string();
        let difficulty = self.ledger.difficulty();
        let MinedNonce {
            nonce,
            hash,
            attempts,
        } = miner::mine(
            &parent,
            difficulty,
            &mut self.rng,
            self.config.max_mining_attempts,
        )?;

        let block = Block::child(parent.weight, nonce, hash, label, self.clock.now_millis());
        let next = self.ledger.add_block(block.clone());
        let difficulty_raised = next.difficulty() > difficulty;
        info!(
            "mined block on {} after {} attempt(s) (nonce={}, difficulty={})",
            id, attempts, nonce, difficulty
        );
        self.commit(next);

        Ok(MiningReport {
            id: block.id(),
            block,
            attempts,
            difficulty: self.ledger.difficulty(),
            difficulty_raised,
        })
    }

    /// Orphan block `id` and its descendants. Genesis is refused.
    pub fn orphan(&mut self, id: &Hash) -> Result<()> {
        let block = self.block(id)?.clone();
        if block.is_genesis() {
            return Err(LedgerError::GenesisImmutable(*id));
        }
        let next = self.ledger.orphan_block(&block)?;
        self.commit(next);
        Ok(())
    }

    /// Drop all orphans; returns how many were removed.
    pub fn clear_orphans(&mut self) -> usize {
        let next = self.ledger.clear_orphans();
        let removed = self.ledger.len() - next.len();
        self.commit(next);
        removed
    }

    pub fn undo(&mut self) -> Result<()> {
        let previous = self.history.pop_back().ok_or(LedgerError::NothingToUndo)?;
        self.ledger = previous;
        debug!("undo: {} snapshot(s) left", self.history.len());
        Ok(())
    }

    /// Start over from a fresh genesis at the configured difficulty.
    pub fn reset(&mut self) {
        self.ledger = Blockchain::new(self.config.initial_difficulty, &self.clock, &mut self.rng);
        self.history.clear();
        debug!("session reset at difficulty {}", self.ledger.difficulty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::clock::test_clock::StepClock;
    use crate::blockchain::{BlockKind, DEFAULT_MINER};

    fn session(difficulty: u32) -> Session<StepClock> {
        let config = Config {
            initial_difficulty: difficulty,
            seed: Some(1234),
            undo_history: 3,
            ..Config::default()
        };
        Session::new(config, StepClock::starting_at(10_000))
    }

    fn tip_id(session: &Session<StepClock>) -> Hash {
        let ledger = session.ledger();
        ledger.blocks()[ledger.len() - 1].id()
    }

    #[test]
    fn mining_extends_the_selected_block() {
        let mut s = session(2);
        let genesis = s.ledger().genesis().id();

        let report = s.mine_on(&genesis, Some("  alice ")).unwrap();
        assert_eq!(report.block.miner, "alice");
        assert_eq!(report.block.weight, 1);
        assert_eq!(report.block.kind, BlockKind::Regular);
        assert!(report.attempts >= 1);
        assert!(report.block.prev_hash.meets_difficulty(2));
        assert_eq!(s.ledger().len(), 2);
        assert_eq!(s.history_len(), 1);

        let parent = s.ledger().parent_of(&report.block).unwrap().unwrap();
        assert_eq!(parent.id(), genesis);
    }

    #[test]
    fn blank_miner_uses_default_label() {
        let mut s = session(0);
        let genesis = s.ledger().genesis().id();
        let report = s.mine_on(&genesis, Some("   ")).unwrap();
        assert_eq!(report.block.miner, DEFAULT_MINER);
        let tip = tip_id(&s);
        assert_eq!(s.mine_on(&tip, None).unwrap().block.miner, DEFAULT_MINER);
    }

    #[test]
    fn difficulty_raise_is_reported() {
        let mut s = session(0);
        let mut raised = Vec::new();
        for _ in 0..5 {
            let tip = tip_id(&s);
            raised.push(s.mine_on(&tip, Some("m")).unwrap().difficulty_raised);
        }
        assert_eq!(raised, vec![false, false, false, false, true]);
        assert_eq!(s.ledger().difficulty(), 1);
    }

    #[test]
    fn stale_blocks_cannot_be_extended() {
        let mut s = session(0);
        let genesis = s.ledger().genesis().id();
        for _ in 0..2 {
            let tip = tip_id(&s);
            s.mine_on(&tip, None).unwrap();
        }
        assert_eq!(
            s.mine_on(&genesis, None).unwrap_err(),
            LedgerError::NotExtendable(genesis)
        );

        let unknown = crate::blockchain::hash::digest("nope");
        assert_eq!(
            s.mine_on(&unknown, None).unwrap_err(),
            LedgerError::BlockNotFound(unknown)
        );
        assert!(s.attempt(&unknown).is_err());
    }

    #[test]
    fn capped_mining_gives_up() {
        let config = Config {
            initial_difficulty: crate::blockchain::MAX_DIFFICULTY,
            max_mining_attempts: Some(0),
            seed: Some(1),
            ..Config::default()
        };
        let mut s = Session::new(config, StepClock::starting_at(0));
        let genesis = s.ledger().genesis().id();
        assert_eq!(
            s.mine_on(&genesis, None).unwrap_err(),
            LedgerError::MiningExhausted { attempts: 0 }
        );
        assert_eq!(s.ledger().len(), 1);
        assert_eq!(s.history_len(), 0);
    }

    #[test]
    fn orphan_clear_and_undo() {
        let mut s = session(0);
        let genesis = s.ledger().genesis().id();
        let first = s.mine_on(&genesis, None).unwrap().id;
        let second = s.mine_on(&genesis, None).unwrap().id;

        s.orphan(&second).unwrap();
        assert_eq!(s.block(&second).unwrap().kind, BlockKind::Orphan);
        assert_eq!(s.block(&first).unwrap().kind, BlockKind::Regular);

        assert_eq!(s.clear_orphans(), 1);
        assert!(s.block(&second).is_err());

        s.undo().unwrap();
        assert_eq!(s.block(&second).unwrap().kind, BlockKind::Orphan);
        s.undo().unwrap();
        assert_eq!(s.block(&second).unwrap().kind, BlockKind::Regular);
    }

    #[test]
    fn genesis_cannot_be_orphaned() {
        let mut s = session(0);
        let genesis = s.ledger().genesis().id();
        let child = s.mine_on(&genesis, None).unwrap().id;
        let depth = s.history_len();

        assert_eq!(
            s.orphan(&genesis).unwrap_err(),
            LedgerError::GenesisImmutable(genesis)
        );
        assert_eq!(s.history_len(), depth);
        assert!(s.ledger().genesis().is_genesis());
        assert_eq!(s.block(&child).unwrap().kind, BlockKind::Regular);
        assert!(s.ledger().can_extend(s.block(&child).unwrap()).unwrap());
    }

    #[test]
    fn undo_history_is_bounded() {
        let mut s = session(0);
        for _ in 0..5 {
            let tip = tip_id(&s);
            s.mine_on(&tip, None).unwrap();
        }
        assert_eq!(s.history_len(), 3);
        for _ in 0..3 {
            s.undo().unwrap();
        }
        assert_eq!(s.ledger().len(), 3);
        assert_eq!(s.undo().unwrap_err(), LedgerError::NothingToUndo);
    }

    #[test]
    fn reset_starts_over() {
        let mut s = session(1);
        let old_genesis = s.ledger().genesis().id();
        let tip = tip_id(&s);
        s.mine_on(&tip, None).unwrap();

        s.reset();
        assert_eq!(s.ledger().len(), 1);
        assert_eq!(s.ledger().difficulty(), 1);
        assert_eq!(s.history_len(), 0);
        assert_ne!(s.ledger().genesis().id(), old_genesis);
    }

    #[test]
    fn single_attempt_uses_ledger_difficulty() {
        let mut s = session(0);
        let genesis = s.ledger().genesis().id();
        let attempt = s.attempt(&genesis).unwrap();
        assert!(attempt.succeeded());
        assert_eq!(s.ledger().len(), 1);
    }
}
