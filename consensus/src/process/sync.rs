//! Sync support queries
//!
//! Builds the chain block locator the sync protocol uses to find a common
//! ancestor with a peer: hashes along the selected chain from high to low,
//! consecutive at first and then with gaps doubling each step.

use crate::consensus::dag::ReachabilityManager;
use crate::consensus::types::{ConsensusError, ConsensusResult};
use consensus_core::Hash;
use database::{ConsensusStorage, StagingArea};
use std::sync::Arc;

/// Number of consecutive ancestors before the locator gaps start doubling
const LOCATOR_INITIAL_RUN: usize = 4;

pub struct SyncManager {
    storage: Arc<ConsensusStorage>,
    reachability: Arc<ReachabilityManager>,
}

impl SyncManager {
    pub fn new(storage: Arc<ConsensusStorage>, reachability: Arc<ReachabilityManager>) -> Self {
        Self { storage, reachability }
    }

    /// Exponentially spaced selected-chain hashes from `high` down to and
    /// including `low`. `low` must be a chain ancestor of `high`.
    pub fn build_block_locator(&self, low: Hash, high: Hash) -> ConsensusResult<Vec<Hash>> {
        let staging = StagingArea::new();
        if !self.reachability.is_chain_ancestor_of(&staging, low, high)? {
            return Err(ConsensusError::InvalidArguments(format!("{low} is not a chain ancestor of {high}")));
        }

        let low_height = self.reachability.height(&staging, low)?;
        let mut locator = Vec::new();
        let mut current = high;
        let mut step: u64 = 1;

        loop {
            locator.push(current);
            if current == low {
                break;
            }
            if locator.len() >= LOCATOR_INITIAL_RUN {
                step *= 2;
            }

            let current_height = self.reachability.height(&staging, current)?;
            if current_height <= low_height + step {
                // The jump would pass low; close the locator with it
                current = low;
            } else {
                for _ in 0..step {
                    current = self.reachability.parent(&staging, current)?;
                }
            }
        }
        Ok(locator)
    }

    pub fn header_count(&self) -> ConsensusResult<u64> {
        Ok(self.storage.metadata.header_count()?)
    }

    pub fn block_count(&self) -> ConsensusResult<u64> {
        Ok(self.storage.metadata.block_count()?)
    }
}
