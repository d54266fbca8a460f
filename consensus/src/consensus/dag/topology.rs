use super::reachability::ReachabilityManager;
use super::relations::RelationsService;
use crate::consensus::types::{ConsensusError, ConsensusResult};
use consensus_core::errors::RuleError;
use consensus_core::{BlockHashSet, BlueWorkType, Hash};
use database::{ConsensusStorage, StagingArea};
use std::sync::Arc;

/// DAG-level topology queries built on the relations edges, with the
/// reachability index as a fast path for chain ancestry.
pub struct DagTopology {
    storage: Arc<ConsensusStorage>,
    relations: Arc<RelationsService>,
    reachability: Arc<ReachabilityManager>,
}

impl DagTopology {
    pub fn new(storage: Arc<ConsensusStorage>, relations: Arc<RelationsService>, reachability: Arc<ReachabilityManager>) -> Self {
        Self { storage, relations, reachability }
    }

    fn blue_work(&self, staging: &StagingArea, hash: &Hash) -> ConsensusResult<BlueWorkType> {
        Ok(staging.ghostdag_required(&self.storage, hash)?.blue_work)
    }

    /// True iff `ancestor` is in the past of `descendant` (or equal).
    ///
    /// Chain ancestry answers directly from the interval index. The
    /// general case walks `descendant`'s past, pruned by the fact that
    /// blue work strictly increases along every parent edge.
    pub fn is_dag_ancestor_of(&self, staging: &StagingArea, ancestor: Hash, descendant: Hash) -> ConsensusResult<bool> {
        if ancestor == descendant {
            return Ok(true);
        }
        if self.reachability.is_chain_ancestor_of(staging, ancestor, descendant)? {
            return Ok(true);
        }

        let ancestor_work = self.blue_work(staging, &ancestor)?;
        let mut visited = BlockHashSet::default();
        let mut queue: Vec<Hash> = self
            .relations
            .parents(staging, &descendant)?
            .ok_or_else(|| ConsensusError::DataCorruption(format!("missing relations for {descendant}")))?;

        while let Some(current) = queue.pop() {
            if !visited.insert(current) {
                continue;
            }
            if current == ancestor {
                return Ok(true);
            }
            if self.reachability.is_chain_ancestor_of(staging, ancestor, current)? {
                return Ok(true);
            }
            // Anything at or below the ancestor's blue work cannot hold it
            // in its past
            if self.blue_work(staging, &current)? <= ancestor_work {
                continue;
            }
            if let Some(parents) = self.relations.parents(staging, &current)? {
                queue.extend(parents);
            }
        }
        Ok(false)
    }

    /// The full past of a block. Prefer reachability or the pruned
    /// ancestry walk; this materializes the set and is meant for rare
    /// diagnostic queries.
    pub fn past(&self, staging: &StagingArea, hash: Hash) -> ConsensusResult<BlockHashSet> {
        let mut past = BlockHashSet::default();
        let mut queue = self.relations.parents(staging, &hash)?.unwrap_or_default();
        while let Some(current) = queue.pop() {
            if !past.insert(current) {
                continue;
            }
            if let Some(parents) = self.relations.parents(staging, &current)? {
                queue.extend(parents);
            }
        }
        Ok(past)
    }

    /// Blocks concurrent with `hash`: reachable from the tips but neither
    /// in the past nor the future of `hash`, excluding `hash` itself
    pub fn anticone(&self, staging: &StagingArea, hash: Hash, tips: &[Hash]) -> ConsensusResult<Vec<Hash>> {
        let mut anticone = Vec::new();
        let mut visited = BlockHashSet::default();
        let mut queue: Vec<Hash> = tips.to_vec();
        while let Some(current) = queue.pop() {
            if !visited.insert(current) {
                continue;
            }
            if !self.is_dag_ancestor_of(staging, current, hash)? && !self.is_dag_ancestor_of(staging, hash, current)? {
                anticone.push(current);
            }
            if let Some(parents) = self.relations.parents(staging, &current)? {
                queue.extend(parents);
            }
        }
        Ok(anticone)
    }

    /// The merge set of a block with the given parents, minus the selected
    /// parent itself: every block in the past of some parent but not in
    /// the selected parent's past.
    ///
    /// Returned in ascending (blue work, hash) order. Blue work strictly
    /// increases along parent edges, so this is a topological order with
    /// hash tie-breaks, as the coloring loop requires.
    pub fn mergeset_without_selected_parent(
        &self,
        staging: &StagingArea,
        selected_parent: Hash,
        parents: &[Hash],
        mergeset_size_limit: u64,
    ) -> ConsensusResult<Vec<Hash>> {
        let mut visited = BlockHashSet::default();
        visited.insert(selected_parent);

        let mut queue: Vec<Hash> = Vec::new();
        for parent in parents.iter().copied().filter(|parent| *parent != selected_parent) {
            if visited.insert(parent) {
                queue.push(parent);
            }
        }

        let mut mergeset: Vec<(BlueWorkType, Hash)> = Vec::new();
        while let Some(current) = queue.pop() {
            mergeset.push((self.blue_work(staging, &current)?, current));
            // The selected parent counts as part of the merge set against
            // the limit
            if mergeset.len() as u64 + 1 > mergeset_size_limit {
                return Err(ConsensusError::RuleViolation(RuleError::MergeSetTooLarge {
                    got: mergeset.len() as u64 + 1,
                    max: mergeset_size_limit,
                }));
            }

            let parents = self
                .relations
                .parents(staging, &current)?
                .ok_or_else(|| ConsensusError::DataCorruption(format!("missing relations for {current}")))?;
            for parent in parents {
                if visited.contains(&parent) {
                    continue;
                }
                // Stop descending once inside the selected parent's past
                if self.is_dag_ancestor_of(staging, parent, selected_parent)? {
                    continue;
                }
                visited.insert(parent);
                queue.push(parent);
            }
        }

        mergeset.sort();
        Ok(mergeset.into_iter().map(|(_, hash)| hash).collect())
    }
}
