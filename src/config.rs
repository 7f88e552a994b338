use std::env;
use std::str::FromStr;

use crate::blockchain::{DEFAULT_DIFFICULTY, DEFAULT_MINER, MAX_DIFFICULTY};

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Difficulty of a freshly reset simulation (clamped to `MAX_DIFFICULTY`).
    pub initial_difficulty: u32,
    pub default_miner: String,
    /// `None` means mining retries until it succeeds.
    pub max_mining_attempts: Option<u64>,
    /// Ledger snapshots kept for undo.
    pub undo_history: usize,
    /// Fixed RNG seed for reproducible sessions.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            initial_difficulty: DEFAULT_DIFFICULTY,
            default_miner: DEFAULT_MINER.to_string(),
            max_mining_attempts: None,
            undo_history: 32,
            seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or unparsable values keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            host: lookup("HOST")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            initial_difficulty: parsed(&lookup, "INITIAL_DIFFICULTY")
                .unwrap_or(defaults.initial_difficulty)
                .min(MAX_DIFFICULTY),
            default_miner: lookup("DEFAULT_MINER")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.default_miner),
            max_mining_attempts: parsed(&lookup, "MAX_MINING_ATTEMPTS")
                .or(defaults.max_mining_attempts),
            undo_history: parsed(&lookup, "UNDO_HISTORY").unwrap_or(defaults.undo_history),
            seed: parsed(&lookup, "SIM_SEED").or(defaults.seed),
        }
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}
