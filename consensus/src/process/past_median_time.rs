//! Past median time
//!
//! A block's timestamp must be strictly greater than the median timestamp
//! of the recent selected-parent-chain blocks. The median makes the rule
//! robust against single outlier timestamps.

use crate::consensus::types::{ConsensusError, ConsensusResult};
use consensus_core::Hash;
use database::{ConsensusStorage, StagingArea};
use std::sync::Arc;

pub struct PastMedianTimeManager {
    window_size: usize,
    storage: Arc<ConsensusStorage>,
}

impl PastMedianTimeManager {
    pub fn new(window_size: usize, storage: Arc<ConsensusStorage>) -> Self {
        Self { window_size, storage }
    }

    /// Median timestamp of up to `window_size` chain blocks ending at
    /// `selected_parent`. `None` (genesis context) yields zero.
    pub fn calc_past_median_time(&self, staging: &StagingArea, selected_parent: Option<Hash>) -> ConsensusResult<u64> {
        let Some(from) = selected_parent else {
            return Ok(0);
        };

        let mut timestamps = Vec::with_capacity(self.window_size);
        let mut current = Some(from);
        while let Some(hash) = current {
            if timestamps.len() == self.window_size {
                break;
            }
            let header = staging
                .header(&self.storage, &hash)?
                .ok_or_else(|| ConsensusError::DataCorruption(format!("missing header for chain block {hash}")))?;
            timestamps.push(header.timestamp);
            current = staging.ghostdag_required(&self.storage, &hash)?.selected_parent;
        }

        Ok(median(&mut timestamps))
    }
}

fn median(timestamps: &mut [u64]) -> u64 {
    debug_assert!(!timestamps.is_empty());
    timestamps.sort_unstable();
    let mid = timestamps.len() / 2;
    if timestamps.len() % 2 == 0 {
        (timestamps[mid - 1] + timestamps[mid]) / 2
    } else {
        timestamps[mid]
    }
}
