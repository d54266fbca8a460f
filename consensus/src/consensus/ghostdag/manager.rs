//! The GHOSTDAG protocol
//!
//! Computes, for a block with given parents, its selected parent, the
//! blue/red partition of its merge set, and its blue score and cumulative
//! blue work.
//!
//! A candidate is added to the blue set only if both k-cluster conditions
//! hold:
//!
//! 1. The candidate has at most K blues of the new block in its anticone.
//! 2. No blue of the new block ends up with more than K blues in its own
//!    anticone once the candidate joins.
//!
//! Condition 2 is checked through `blues_anticone_sizes`, a per-block map
//! of the anticone sizes affected by that block's coloring; resolving a
//! size walks the new block's selected-parent chain until a recorded entry
//! is found. See <https://eprint.iacr.org/2018/104.pdf> for the protocol.

use crate::consensus::dag::topology::DagTopology;
use crate::consensus::types::{ConsensusError, ConsensusResult};
use consensus_core::difficulty::calc_work;
use consensus_core::{BlockHashMap, BlueWorkType, Hash, KType};
use database::stores::GhostdagData;
use database::{ConsensusStorage, StagingArea};
use std::sync::Arc;

pub struct GhostdagManager {
    k: KType,
    genesis_hash: Hash,
    mergeset_size_limit: u64,
    storage: Arc<ConsensusStorage>,
    topology: Arc<DagTopology>,
}

/// Verdict of one chain-block step while classifying a candidate
enum ChainStepOutcome {
    Blue,
    Red,
    Continue,
}

impl GhostdagManager {
    pub fn new(
        k: KType,
        genesis_hash: Hash,
        mergeset_size_limit: u64,
        storage: Arc<ConsensusStorage>,
        topology: Arc<DagTopology>,
    ) -> Self {
        Self { k, genesis_hash, mergeset_size_limit, storage, topology }
    }

    /// Runs GHOSTDAG for a block with the given direct parents. Pure with
    /// respect to the staging area: the caller stages the result.
    pub fn ghostdag(&self, staging: &StagingArea, parents: &[Hash]) -> ConsensusResult<GhostdagData> {
        if parents.is_empty() {
            // Genesis: blue score and work are defined to be zero
            return Ok(GhostdagData::new_genesis());
        }

        let selected_parent = self.find_selected_parent(staging, parents)?;
        let mut new_data = GhostdagData::new_with_selected_parent(selected_parent);

        let mergeset =
            self.topology.mergeset_without_selected_parent(staging, selected_parent, parents, self.mergeset_size_limit)?;

        for candidate in mergeset {
            match self.check_blue_candidate(staging, &new_data, candidate)? {
                Some((candidate_anticone_size, candidate_blues_anticone_sizes)) => {
                    // No k-cluster violation: the candidate joins the blues
                    // and every affected blue's anticone grows by one
                    new_data.mergeset_blues.push(candidate);
                    new_data.blues_anticone_sizes.insert(candidate, candidate_anticone_size);
                    for (blue, size) in candidate_blues_anticone_sizes {
                        new_data.blues_anticone_sizes.insert(blue, size + 1);
                    }
                }
                None => new_data.mergeset_reds.push(candidate),
            }
        }

        let selected_parent_data = staging.ghostdag_required(&self.storage, &selected_parent)?;
        new_data.blue_score = selected_parent_data.blue_score + new_data.mergeset_blues.len() as u64;

        // Blue work is inherited from the selected parent, plus the work
        // (not blue work) of every blue in the merge set
        let mut blue_work = selected_parent_data.blue_work;
        for blue in &new_data.mergeset_blues {
            let header = staging
                .header(&self.storage, blue)?
                .ok_or_else(|| ConsensusError::DataCorruption(format!("missing header for blue block {blue}")))?;
            blue_work += calc_work(header.bits);
        }
        new_data.blue_work = blue_work;

        Ok(new_data)
    }

    /// The parent maximizing (blue work, hash); the hash tie-break is
    /// arbitrary but must match across every node on the network
    fn find_selected_parent(&self, staging: &StagingArea, parents: &[Hash]) -> ConsensusResult<Hash> {
        let mut best: Option<(BlueWorkType, Hash)> = None;
        for parent in parents {
            let data = staging.ghostdag_required(&self.storage, parent)?;
            let key = (data.blue_work, *parent);
            if best.is_none() || key > best.unwrap() {
                best = Some(key);
            }
        }
        best.map(|(_, hash)| hash).ok_or_else(|| ConsensusError::DataCorruption("selected parent over empty parent set".into()))
    }

    /// Classifies one candidate. Returns the candidate's blue anticone
    /// size and the affected blues' current sizes when blue, `None` when
    /// red.
    fn check_blue_candidate(
        &self,
        staging: &StagingArea,
        new_data: &GhostdagData,
        candidate: Hash,
    ) -> ConsensusResult<Option<(KType, BlockHashMap<KType>)>> {
        // The blues can hold at most k+1 blocks: k plus the selected parent
        if new_data.mergeset_blues.len() as u64 == self.k as u64 + 1 {
            return Ok(None);
        }

        let mut candidate_blues_anticone_sizes: BlockHashMap<KType> = BlockHashMap::default();
        let mut candidate_anticone_size: KType = 0;

        // Walk down the new block's selected-parent chain. The first chain
        // block (the new block itself) has no hash yet.
        let mut chain_hash: Option<Hash> = None;
        let mut chain_data: Arc<GhostdagData> = Arc::new(new_data.clone());

        loop {
            match self.check_candidate_with_chain_block(
                staging,
                new_data,
                chain_hash,
                &chain_data,
                candidate,
                &mut candidate_blues_anticone_sizes,
                &mut candidate_anticone_size,
            )? {
                ChainStepOutcome::Blue => return Ok(Some((candidate_anticone_size, candidate_blues_anticone_sizes))),
                ChainStepOutcome::Red => return Ok(None),
                ChainStepOutcome::Continue => {}
            }

            let next = chain_data.selected_parent.ok_or_else(|| {
                ConsensusError::DataCorruption(format!("chain walk for candidate {candidate} ran past genesis"))
            })?;
            chain_data = staging.ghostdag_required(&self.storage, &next)?;
            chain_hash = Some(next);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn check_candidate_with_chain_block(
        &self,
        staging: &StagingArea,
        new_data: &GhostdagData,
        chain_hash: Option<Hash>,
        chain_data: &GhostdagData,
        candidate: Hash,
        candidate_blues_anticone_sizes: &mut BlockHashMap<KType>,
        candidate_anticone_size: &mut KType,
    ) -> ConsensusResult<ChainStepOutcome> {
        // Once the chain block is an ancestor of the candidate, all
        // remaining blues are in the candidate's past and its anticone has
        // stabilized below k: the candidate is blue. The new block itself
        // (no hash) is always in the candidate's future and is skipped.
        if let Some(hash) = chain_hash {
            if self.topology.is_dag_ancestor_of(staging, hash, candidate)? {
                return Ok(ChainStepOutcome::Blue);
            }
        }

        for block in chain_data.mergeset_blues.iter().copied() {
            // Blues in the candidate's past do not belong to its anticone
            if self.topology.is_dag_ancestor_of(staging, block, candidate)? {
                continue;
            }

            let size = self.blue_anticone_size(staging, block, new_data)?;
            candidate_blues_anticone_sizes.insert(block, size);

            *candidate_anticone_size += 1;
            if *candidate_anticone_size > self.k {
                // The candidate's own blue anticone exceeded k
                return Ok(ChainStepOutcome::Red);
            }
            if size == self.k {
                // Adding the candidate would push this blue's anticone
                // over k
                return Ok(ChainStepOutcome::Red);
            }
            if size > self.k {
                // Sanity: an already-over-k blue means the store is corrupt
                return Err(ConsensusError::DataCorruption(format!(
                    "blue block {block} has anticone size {size}, larger than k={}",
                    self.k
                )));
            }
        }

        Ok(ChainStepOutcome::Continue)
    }

    /// The blue anticone size of `block` from the worldview of `context`.
    /// Expects `block` to be blue in that worldview; walks the selected
    /// chain until a recorded entry is found.
    fn blue_anticone_size(&self, staging: &StagingArea, block: Hash, context: &GhostdagData) -> ConsensusResult<KType> {
        if let Some(size) = context.blues_anticone_sizes.get(&block) {
            return Ok(*size);
        }

        let mut current = context.selected_parent;
        while let Some(chain_block) = current {
            if chain_block == self.genesis_hash {
                break;
            }
            let data = staging.ghostdag_required(&self.storage, &chain_block)?;
            if let Some(size) = data.blues_anticone_sizes.get(&block) {
                return Ok(*size);
            }
            current = data.selected_parent;
        }

        Err(ConsensusError::DataCorruption(format!("block {block} is not in the blue set of the given context")))
    }
}
