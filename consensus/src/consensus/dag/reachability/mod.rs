//! Interval-based reachability index
//!
//! Every block owns an interval nested inside its selected parent's
//! interval, so `is-ancestor-of` over the selected-parent tree reduces to
//! interval containment. Inserting allocates half of the parent's
//! remaining slack; when a subtree runs dry its intervals are rebalanced
//! proportionally to subtree sizes, bounded by a cached reindex root that
//! advances along the selected chain as the DAG grows.

mod manager;
mod reindex;

pub use manager::{ReachabilityManager, DEFAULT_REINDEX_DEPTH, DEFAULT_REINDEX_SLACK};
