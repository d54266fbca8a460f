//! Core consensus data model for the Vexa BlockDAG
//!
//! This crate defines the block, header and transaction structures, the
//! network parameters and genesis, difficulty encoding, and the seams
//! (script engine, mass calculator) the consensus crate builds on.

pub mod block;
pub mod config;
pub mod constants;
pub mod difficulty;
pub mod errors;
pub mod hashing;
pub mod header;
pub mod mass;
pub mod merkle;
pub mod script;
pub mod status;
pub mod subnets;
pub mod tx;

use std::collections::{HashMap, HashSet};

// Re-export key hash types for easier access
pub use crypto_hashes::{BlockHasher, Hash, HASH_SIZE, ZERO_HASH};

/// Cumulative proof-of-work accumulator type
pub type BlueWorkType = math::Uint192;

/// The type used to represent blue anticone sizes; bounded by the GHOSTDAG
/// K parameter, which fits comfortably in a byte.
pub type KType = u8;

/// Block level in the proof hierarchy
pub type BlockLevel = u8;

/// Map and set types keyed by block hash, using the passthrough hasher
pub type BlockHashMap<V> = HashMap<Hash, V, BlockHasher>;
pub type BlockHashSet = HashSet<Hash, BlockHasher>;
