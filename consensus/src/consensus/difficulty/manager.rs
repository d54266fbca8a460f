//! Difficulty adjustment (DAA)
//!
//! The expected bits of a block are derived from a window of the most
//! recent selected-chain blocks ending at its selected parent: the window
//! targets are averaged and scaled by the ratio of the observed timespan
//! to the expected one. Validation demands exact equality against this
//! computation, so every step is integer arithmetic.

use super::window::{DifficultyBlock, DifficultyWindow};
use crate::consensus::types::{ConsensusError, ConsensusResult};
use consensus_core::difficulty::{big_to_compact, compact_to_big};
use consensus_core::Hash;
use database::stores::GhostdagData;
use database::{ConsensusStorage, StagingArea};
use primitive_types::{U256, U512};
use std::sync::Arc;

pub struct DifficultyManager {
    genesis_bits: u32,
    window_size: usize,
    target_time_per_block: u64,
    storage: Arc<ConsensusStorage>,
}

impl DifficultyManager {
    pub fn new(genesis_bits: u32, window_size: usize, target_time_per_block: u64, storage: Arc<ConsensusStorage>) -> Self {
        Self { genesis_bits, window_size, target_time_per_block, storage }
    }

    /// DAA score: the selected parent's score advanced by the whole merge
    /// set (blues and reds alike)
    pub fn calc_daa_score(&self, staging: &StagingArea, ghostdag_data: &GhostdagData) -> ConsensusResult<u64> {
        match ghostdag_data.selected_parent {
            None => Ok(0),
            Some(selected_parent) => {
                let header = staging
                    .header(&self.storage, &selected_parent)?
                    .ok_or_else(|| ConsensusError::DataCorruption(format!("missing header for {selected_parent}")))?;
                Ok(header.daa_score + ghostdag_data.mergeset_size())
            }
        }
    }

    /// Expected compact bits for a block whose selected parent is
    /// `selected_parent`; `None` (genesis) yields the genesis bits
    pub fn expected_bits(&self, staging: &StagingArea, selected_parent: Option<Hash>) -> ConsensusResult<u32> {
        let Some(selected_parent) = selected_parent else {
            return Ok(self.genesis_bits);
        };
        let window = self.collect_window(staging, selected_parent)?;
        Ok(self.bits_from_window(&window))
    }

    /// Walks the selected-parent chain collecting up to `window_size`
    /// blocks, starting at and including `from`
    fn collect_window(&self, staging: &StagingArea, from: Hash) -> ConsensusResult<DifficultyWindow> {
        let mut window = DifficultyWindow::new();
        let mut current = Some(from);
        while let Some(hash) = current {
            if window.len() == self.window_size {
                break;
            }
            let header = staging
                .header(&self.storage, &hash)?
                .ok_or_else(|| ConsensusError::DataCorruption(format!("missing header for chain block {hash}")))?;
            window.add(DifficultyBlock { timestamp: header.timestamp, bits: header.bits });
            current = staging.ghostdag_required(&self.storage, &hash)?.selected_parent;
        }
        Ok(window)
    }

    /// The deterministic retarget formula. A partial window (the chain is
    /// younger than one full window) keeps the genesis difficulty.
    pub fn bits_from_window(&self, window: &DifficultyWindow) -> u32 {
        if window.len() < self.window_size {
            return self.genesis_bits;
        }

        let count = window.len() as u64;
        // Average the targets, dividing each before summing so the sum
        // stays inside 256 bits
        let mut average_target = U256::zero();
        for block in window.blocks() {
            average_target += compact_to_big(block.bits) / U256::from(count);
        }

        let actual_timespan = window.timespan().unwrap_or(0).max(1);
        let expected_timespan = self.target_time_per_block * (count - 1);

        // Scale in 512 bits: average * actual / expected can transiently
        // overflow 256
        let scaled = U512::from(average_target) * U512::from(actual_timespan) / U512::from(expected_timespan.max(1));
        let max_target = compact_to_big(self.genesis_bits);
        let new_target = if scaled > U512::from(max_target) { max_target } else { U256::try_from(scaled).unwrap() };

        big_to_compact(new_target)
    }
}
