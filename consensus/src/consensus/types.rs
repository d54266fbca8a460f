//! Consensus-facing types: errors, reject reasons, query results and the
//! in-memory virtual state.

use consensus_core::errors::RuleError;
use consensus_core::status::BlockStatus;
use consensus_core::{BlueWorkType, Hash};
use database::stores::GhostdagData;
use database::DbError;
use thiserror::Error;

/// The error partition of the consensus core. Nothing is recovered
/// internally: staging is all-or-nothing and every failure surfaces here.
#[derive(Error, Debug)]
pub enum ConsensusError {
    /// A consensus rule was broken; the block is invalid and the verdict
    /// is persisted
    #[error("rule violation: {0}")]
    RuleViolation(#[from] RuleError),

    /// Some direct parents are unknown. A scheduling signal, not a verdict
    /// on the block; nothing is persisted.
    #[error("missing parents: {0:?}")]
    MissingParents(Vec<Hash>),

    /// Our own persisted state failed an invariant on read-back
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The caller passed arguments that reference unknown or inconsistent
    /// blocks
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("store error: {0}")]
    Store(#[from] DbError),
}

pub type ConsensusResult<T> = Result<T, ConsensusError>;

/// Why a submitted block was not accepted
#[derive(Error, Debug)]
pub enum RejectReason {
    #[error("block is already known")]
    Duplicate,

    #[error("block was already found invalid")]
    KnownInvalid,

    #[error("block parents are unknown: {0:?}")]
    MissingParents(Vec<Hash>),

    #[error("invalid proof of work")]
    PowInvalid,

    #[error("merkle root mismatch")]
    MerkleMismatch,

    #[error("invalid transactions: {0}")]
    InvalidTransactions(RuleError),

    #[error("rule violation: {0}")]
    RuleViolation(RuleError),

    #[error("node is in initial block download")]
    InIbd,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ConsensusError> for RejectReason {
    fn from(err: ConsensusError) -> Self {
        match err {
            ConsensusError::RuleViolation(RuleError::InvalidProofOfWork) => RejectReason::PowInvalid,
            ConsensusError::RuleViolation(RuleError::BadMerkleRoot { .. }) => RejectReason::MerkleMismatch,
            ConsensusError::RuleViolation(
                rule @ (RuleError::NoTransactions
                | RuleError::FirstTxNotCoinbase
                | RuleError::MultipleCoinbases(_)
                | RuleError::DuplicateTransaction(_)
                | RuleError::ExceedsBlockMassLimit { .. }
                | RuleError::ScriptFailure { .. }),
            ) => RejectReason::InvalidTransactions(rule),
            ConsensusError::RuleViolation(rule) => RejectReason::RuleViolation(rule),
            ConsensusError::MissingParents(parents) => RejectReason::MissingParents(parents),
            other => RejectReason::Internal(other.to_string()),
        }
    }
}

/// The synthetic block whose parents are the current DAG tips. It carries
/// GHOSTDAG data but never a header on disk; its selected parent is the
/// selected tip and its view defines the canonical chain.
#[derive(Debug, Clone)]
pub struct VirtualState {
    /// The current DAG tips, i.e. the virtual block's parents
    pub parents: Vec<Hash>,
    pub ghostdag_data: GhostdagData,
    /// DAA score the next block will carry
    pub daa_score: u64,
    /// Expected difficulty bits for the next block
    pub bits: u32,
    pub past_median_time: u64,
}

impl VirtualState {
    /// The selected tip of the DAG; `None` only before genesis insertion
    pub fn selected_parent(&self) -> Option<Hash> {
        self.ghostdag_data.selected_parent
    }
}

/// Per-block consensus information surfaced to queries
#[derive(Debug, Clone)]
pub struct BlockInfo {
    pub hash: Hash,
    pub status: BlockStatus,
    pub blue_score: u64,
    pub blue_work: BlueWorkType,
    pub selected_parent: Option<Hash>,
    pub mergeset_blues: Vec<Hash>,
    pub mergeset_reds: Vec<Hash>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncInfo {
    pub header_count: u64,
    pub block_count: u64,
    pub is_synced: bool,
}
