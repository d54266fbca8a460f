use crate::{BlueWorkType, Hash};
use thiserror::Error;

/// A consensus rule broken by a submitted header or block. Rule violations
/// are final: the offending block is marked invalid and never revisited.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("wrong block version: expected {expected}, got {got}")]
    WrongBlockVersion { expected: u16, got: u16 },

    #[error("block has no parents")]
    NoParents,

    #[error("block has {got} direct parents, over the limit of {max}")]
    TooManyParents { got: usize, max: usize },

    #[error("block lists parent {0} more than once")]
    DuplicateParents(Hash),

    #[error("parent {0} is known to be invalid")]
    InvalidParent(Hash),

    #[error("block proof of work is above its declared target")]
    InvalidProofOfWork,

    #[error("unexpected difficulty: expected bits {expected:#010x}, got {got:#010x}")]
    UnexpectedDifficulty { expected: u32, got: u32 },

    #[error("timestamp {timestamp} is not after the past median time {past_median_time}")]
    TimeTooOld { timestamp: u64, past_median_time: u64 },

    #[error("timestamp {timestamp} is more than allowed ahead of adjusted time {max_allowed}")]
    TimeTooFarIntoFuture { timestamp: u64, max_allowed: u64 },

    #[error("merkle root mismatch: header declares {declared}, transactions give {computed}")]
    BadMerkleRoot { declared: Hash, computed: Hash },

    #[error("declared blue score {declared} does not match computed {computed}")]
    BadBlueScore { declared: u64, computed: u64 },

    #[error("declared blue work {declared} does not match computed {computed}")]
    BadBlueWork { declared: BlueWorkType, computed: BlueWorkType },

    #[error("declared DAA score {declared} does not match computed {computed}")]
    BadDaaScore { declared: u64, computed: u64 },

    #[error("merge set size {got} is over the limit of {max}")]
    MergeSetTooLarge { got: u64, max: u64 },

    #[error("block has no transactions")]
    NoTransactions,

    #[error("first transaction of a block must be coinbase")]
    FirstTxNotCoinbase,

    #[error("transaction at index {0} is an extra coinbase")]
    MultipleCoinbases(usize),

    #[error("transaction {0} appears more than once in the block")]
    DuplicateTransaction(Hash),

    #[error("block mass {got} is over the limit of {max}")]
    ExceedsBlockMassLimit { got: u64, max: u64 },

    #[error("script verification failed for input {input} of transaction {tx}")]
    ScriptFailure { tx: Hash, input: usize },
}
