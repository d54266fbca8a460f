//! Consensus engine for the Vexa BlockDAG
//!
//! This crate implements the consensus core: GHOSTDAG ordering, the
//! interval-based reachability index, DAG topology queries, difficulty
//! adjustment, header and block validation, and the submission pipeline
//! that stages and atomically commits every accepted block.

pub mod consensus;
pub mod pipeline;
pub mod process;

// Re-export key types for easier access
pub use consensus_core::Hash;

pub use consensus::dag::{DagTopology, ReachabilityManager, RelationsService};
pub use consensus::difficulty::{DifficultyManager, DifficultyWindow};
pub use consensus::ghostdag::GhostdagManager;
pub use consensus::types::{BlockInfo, ConsensusError, ConsensusResult, RejectReason, SyncInfo, VirtualState};
pub use consensus::validation::{BlockValidator, HeaderValidator};
pub use consensus::Consensus;

pub use pipeline::{HeaderProcessor, VirtualProcessor};
pub use process::mining::{BlockTemplate, BlockTemplateBuilder};
pub use process::past_median_time::PastMedianTimeManager;
pub use process::sync::SyncManager;

/// Milliseconds since the Unix epoch
pub(crate) fn unix_now_ms() -> u64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).expect("system clock before epoch").as_millis() as u64
}
