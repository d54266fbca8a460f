//! Virtual state maintenance
//!
//! After every commit-worthy change the virtual block (the synthetic head
//! whose parents are the DAG tips) is recomputed: its GHOSTDAG view picks
//! the canonical chain, and the expected difficulty and timestamps for the
//! next block fall out of the same view. The reindex-root cache follows
//! the virtual selected parent down the chain.

use crate::consensus::dag::ReachabilityManager;
use crate::consensus::difficulty::DifficultyManager;
use crate::consensus::ghostdag::GhostdagManager;
use crate::consensus::types::{ConsensusError, ConsensusResult, VirtualState};
use crate::process::past_median_time::PastMedianTimeManager;
use consensus_core::Hash;
use database::StagingArea;
use std::sync::Arc;
use tracing::debug;

pub struct VirtualProcessor {
    ghostdag: Arc<GhostdagManager>,
    difficulty: Arc<DifficultyManager>,
    past_median_time: Arc<PastMedianTimeManager>,
    reachability: Arc<ReachabilityManager>,
}

impl VirtualProcessor {
    pub fn new(
        ghostdag: Arc<GhostdagManager>,
        difficulty: Arc<DifficultyManager>,
        past_median_time: Arc<PastMedianTimeManager>,
        reachability: Arc<ReachabilityManager>,
    ) -> Self {
        Self { ghostdag, difficulty, past_median_time, reachability }
    }

    /// Recomputes the virtual over the given tips, staging any reindex
    /// root movement alongside
    pub fn update_virtual(&self, staging: &mut StagingArea, tips: Vec<Hash>) -> ConsensusResult<VirtualState> {
        if tips.is_empty() {
            return Err(ConsensusError::DataCorruption("virtual update with no tips".into()));
        }

        let ghostdag_data = self.ghostdag.ghostdag(staging, &tips)?;
        let selected_parent = ghostdag_data
            .selected_parent
            .ok_or_else(|| ConsensusError::DataCorruption("virtual has tips but no selected parent".into()))?;

        let daa_score = self.difficulty.calc_daa_score(staging, &ghostdag_data)?;
        let bits = self.difficulty.expected_bits(staging, Some(selected_parent))?;
        let past_median_time = self.past_median_time.calc_past_median_time(staging, Some(selected_parent))?;

        self.reachability.try_advancing_reindex_root(staging, selected_parent)?;

        debug!(%selected_parent, blue_score = ghostdag_data.blue_score, "virtual updated");
        Ok(VirtualState { parents: tips, ghostdag_data, daa_score, bits, past_median_time })
    }
}
