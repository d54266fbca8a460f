//! The header acceptance pipeline
//!
//! Runs every header rule against one staging area: syntax, parent
//! resolution, proof of work, GHOSTDAG, the declared consensus fields,
//! difficulty, timestamps, and the reachability insert. Nothing touches
//! the store; the caller commits or discards the staging area whole.

use crate::consensus::dag::{ReachabilityManager, RelationsService};
use crate::consensus::difficulty::DifficultyManager;
use crate::consensus::ghostdag::GhostdagManager;
use crate::consensus::types::{ConsensusError, ConsensusResult};
use crate::consensus::validation::HeaderValidator;
use crate::process::past_median_time::PastMedianTimeManager;
use consensus_core::header::Header;
use database::stores::GhostdagData;
use database::StagingArea;
use std::sync::Arc;
use tracing::debug;

pub struct HeaderProcessor {
    validator: Arc<HeaderValidator>,
    relations: Arc<RelationsService>,
    reachability: Arc<ReachabilityManager>,
    ghostdag: Arc<GhostdagManager>,
    difficulty: Arc<DifficultyManager>,
    past_median_time: Arc<PastMedianTimeManager>,
}

impl HeaderProcessor {
    pub fn new(
        validator: Arc<HeaderValidator>,
        relations: Arc<RelationsService>,
        reachability: Arc<ReachabilityManager>,
        ghostdag: Arc<GhostdagManager>,
        difficulty: Arc<DifficultyManager>,
        past_median_time: Arc<PastMedianTimeManager>,
    ) -> Self {
        Self { validator, relations, reachability, ghostdag, difficulty, past_median_time }
    }

    /// Validates one header and stages its acceptance. On any error the
    /// staging area is abandoned by the caller and the store is untouched.
    pub fn process_header(&self, staging: &mut StagingArea, header: &Arc<Header>) -> ConsensusResult<GhostdagData> {
        let hash = header.hash;

        self.validator.check_header_in_isolation(header)?;
        self.validator.check_parents_known(staging, header)?;
        self.validator.check_pow(header)?;

        let ghostdag_data = self.ghostdag.ghostdag(staging, header.direct_parents())?;
        let selected_parent = ghostdag_data
            .selected_parent
            .ok_or_else(|| ConsensusError::DataCorruption(format!("non-genesis block {hash} has no selected parent")))?;

        let daa_score = self.difficulty.calc_daa_score(staging, &ghostdag_data)?;
        self.validator.check_declared_ghostdag_fields(header, &ghostdag_data, daa_score)?;

        let expected_bits = self.difficulty.expected_bits(staging, Some(selected_parent))?;
        self.validator.check_difficulty(header, expected_bits)?;

        let past_median_time = self.past_median_time.calc_past_median_time(staging, Some(selected_parent))?;
        self.validator.check_timestamp(header, past_median_time)?;

        // All rules passed; stage the block
        self.relations.add_block(staging, hash, header.direct_parents().to_vec())?;
        staging.stage_header(hash, header.clone());
        staging.stage_ghostdag(hash, ghostdag_data.clone());
        self.reachability.add_block(staging, hash, selected_parent)?;
        staging.bump_header_count();

        debug!(%hash, blue_score = ghostdag_data.blue_score, "header staged");
        Ok(ghostdag_data)
    }
}
