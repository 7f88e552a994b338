//! Educational proof-of-work ledger simulator.
//!
//! `blockchain` holds the ledger core (hashing, Merkle roots, blocks, fork
//! choice); `session` and `api` are the presentation-facing layers on top.

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod session;
pub mod transaction;
