use super::reindex::ReindexContext;
use crate::consensus::types::{ConsensusError, ConsensusResult};
use consensus_core::{Hash, ZERO_HASH};
use database::stores::{Interval, ReachabilityData};
use database::{ConsensusStorage, StagingArea};
use std::sync::Arc;
use tracing::{debug, info};

/// How far below the virtual selected parent the reindex root is kept
pub const DEFAULT_REINDEX_DEPTH: u64 = 100;

/// Interval slack reserved for future growth when rebalancing
pub const DEFAULT_REINDEX_SLACK: u64 = 1 << 12;

pub struct ReachabilityManager {
    storage: Arc<ConsensusStorage>,
    reindex_depth: u64,
    reindex_slack: u64,
}

impl ReachabilityManager {
    pub fn new(storage: Arc<ConsensusStorage>) -> Self {
        Self::with_params(storage, DEFAULT_REINDEX_DEPTH, DEFAULT_REINDEX_SLACK)
    }

    /// Shrunk parameters let tests exercise reindexing on small trees
    pub fn with_params(storage: Arc<ConsensusStorage>, reindex_depth: u64, reindex_slack: u64) -> Self {
        Self { storage, reindex_depth, reindex_slack }
    }

    /// Stages the tree root: genesis owns the entire representable range
    pub fn init(&self, staging: &mut StagingArea, genesis: Hash) -> ConsensusResult<()> {
        if staging.has_reachability(&self.storage, &genesis)? {
            return Ok(());
        }
        staging.stage_reachability(genesis, ReachabilityData::new(Interval::maximal(), ZERO_HASH, 0));
        staging.stage_reindex_root(genesis);
        Ok(())
    }

    /// Inserts a block under its selected parent and allocates it an
    /// interval, reindexing if the parent's slack is exhausted
    pub fn add_block(&self, staging: &mut StagingArea, block: Hash, selected_parent: Hash) -> ConsensusResult<()> {
        let mut parent_data = staging.reachability_required(&self.storage, &selected_parent)?;
        let height = parent_data.height + 1;
        parent_data.children.push(block);
        staging.stage_reachability(selected_parent, parent_data);
        staging.stage_reachability(block, ReachabilityData::new(Interval::empty(), selected_parent, height));

        self.allocate_interval(staging, selected_parent, block)
    }

    /// True iff `ancestor` lies on the selected-parent chain from
    /// `descendant` to genesis (inclusive on both ends)
    pub fn is_chain_ancestor_of(&self, staging: &StagingArea, ancestor: Hash, descendant: Hash) -> ConsensusResult<bool> {
        let ancestor_data = staging.reachability_required(&self.storage, &ancestor)?;
        let descendant_data = staging.reachability_required(&self.storage, &descendant)?;
        Ok(ancestor_data.interval.contains(descendant_data.interval))
    }

    pub fn height(&self, staging: &StagingArea, hash: Hash) -> ConsensusResult<u64> {
        Ok(staging.reachability_required(&self.storage, &hash)?.height)
    }

    /// The tree parent (selected parent) of a block
    pub fn parent(&self, staging: &StagingArea, hash: Hash) -> ConsensusResult<Hash> {
        Ok(staging.reachability_required(&self.storage, &hash)?.parent)
    }

    fn allocate_interval(&self, staging: &mut StagingArea, parent: Hash, block: Hash) -> ConsensusResult<()> {
        let remaining = self.remaining_interval_after(staging, parent)?;
        if remaining.is_empty() {
            // Rebalance; the new (empty-interval) node is already part of
            // the tree, so the reindex assigns its share as well
            self.reindex_intervals(staging, parent)?;
            let assigned = staging.reachability_required(&self.storage, &block)?;
            if assigned.interval.is_empty() {
                return Err(ConsensusError::DataCorruption(format!("reindex failed to allocate an interval for {block}")));
            }
            return Ok(());
        }

        // Take half the remaining free space, at least one slot
        let size = std::cmp::max(1, remaining.size() / 2);
        let mut data = staging.reachability_required(&self.storage, &block)?;
        data.interval = Interval::new(remaining.start, remaining.start + size - 1);
        staging.stage_reachability(block, data);
        Ok(())
    }

    /// The yet-unallocated tail of a node's child region
    fn remaining_interval_after(&self, staging: &StagingArea, hash: Hash) -> ConsensusResult<Interval> {
        let data = staging.reachability_required(&self.storage, &hash)?;
        let mut next_start = data.interval.start;
        for child in &data.children {
            let child_data = staging.reachability_required(&self.storage, child)?;
            if !child_data.interval.is_empty() {
                next_start = next_start.max(child_data.interval.end + 1);
            }
        }
        // The node's own slot is its interval end
        Ok(Interval::new(next_start, data.interval.end - 1))
    }

    /// Climbs from the exhausted node to the closest ancestor whose
    /// interval fits the subtree (with slack where possible; the cached
    /// reindex root and the tree root accept an exact fit), then
    /// redistributes that ancestor's subtree proportionally.
    fn reindex_intervals(&self, staging: &mut StagingArea, from: Hash) -> ConsensusResult<()> {
        let reindex_root = staging
            .reindex_root(&self.storage)?
            .ok_or_else(|| ConsensusError::DataCorruption("reachability reindex root is missing".into()))?;

        let mut ctx = ReindexContext::new();
        let mut current = from;
        loop {
            let data = staging.reachability_required(&self.storage, &current)?;
            ctx.count_subtree_sizes(&self.storage, staging, current)?;
            let subtree = ctx.size(&current);
            let capacity = data.interval.size();
            let is_tree_root = data.parent == ZERO_HASH;

            if capacity >= subtree + self.reindex_slack {
                break;
            }
            if capacity >= subtree && (current == reindex_root || is_tree_root) {
                break;
            }
            if is_tree_root {
                return Err(ConsensusError::DataCorruption(
                    "fatal reachability overflow: the root interval cannot host the tree".into(),
                ));
            }
            current = data.parent;
        }

        debug!(root = %current, subtree = ctx.size(&current), "reindexing reachability intervals");
        ctx.propagate_interval(&self.storage, staging, current)
    }

    /// Advances the cached reindex root along the selected-parent chain
    /// toward `hint` (the virtual selected parent), concentrating interval
    /// slack onto the chain as it goes
    pub fn try_advancing_reindex_root(&self, staging: &mut StagingArea, hint: Hash) -> ConsensusResult<()> {
        let Some(mut root) = staging.reindex_root(&self.storage)? else {
            return Ok(());
        };
        let hint_height = staging.reachability_required(&self.storage, &hint)?.height;

        let mut advanced = false;
        loop {
            let root_data = staging.reachability_required(&self.storage, &root)?;
            let mut chosen = None;
            for child in &root_data.children {
                if self.is_chain_ancestor_of(staging, *child, hint)? {
                    chosen = Some(*child);
                    break;
                }
            }
            let Some(chosen) = chosen else { break };

            let chosen_height = staging.reachability_required(&self.storage, &chosen)?.height;
            if hint_height < chosen_height + self.reindex_depth {
                break;
            }

            self.concentrate_interval(staging, root, chosen)?;
            root = chosen;
            advanced = true;
        }

        if advanced {
            staging.stage_reindex_root(root);
            info!(new_root = %root, "reachability reindex root advanced");
        }
        Ok(())
    }

    /// Tightens the off-chain sibling subtrees of `chosen` to their size
    /// plus slack and grows `chosen`'s interval over the freed space. The
    /// chosen interval only ever extends, so its subtree layout stays
    /// valid without repropagation.
    fn concentrate_interval(&self, staging: &mut StagingArea, parent: Hash, chosen: Hash) -> ConsensusResult<()> {
        let parent_data = staging.reachability_required(&self.storage, &parent)?;
        let chosen_interval = staging.reachability_required(&self.storage, &chosen)?.interval;

        let mut left = Vec::new();
        let mut right = Vec::new();
        for child in parent_data.children.iter().copied().filter(|child| *child != chosen) {
            let interval = staging.reachability_required(&self.storage, &child)?.interval;
            if interval.end < chosen_interval.start {
                left.push((child, interval));
            } else {
                right.push((child, interval));
            }
        }
        left.sort_by_key(|(_, interval)| interval.start);
        right.sort_by_key(|(_, interval)| interval.start);

        let mut ctx = ReindexContext::new();

        // Pack left siblings against the region start; sizes never grow,
        // so the chosen interval is only ever extended
        let mut cursor = parent_data.interval.start;
        for (sibling, old) in left {
            ctx.count_subtree_sizes(&self.storage, staging, sibling)?;
            let size = old.size().min(ctx.size(&sibling) + self.reindex_slack);
            let mut data = staging.reachability_required(&self.storage, &sibling)?;
            data.interval = Interval::new(cursor, cursor + size - 1);
            staging.stage_reachability(sibling, data);
            ctx.propagate_interval(&self.storage, staging, sibling)?;
            cursor += size;
        }
        let chosen_start = cursor;

        // Pack right siblings against the region end
        let mut rcursor = parent_data.interval.end - 1;
        for (sibling, old) in right.into_iter().rev() {
            ctx.count_subtree_sizes(&self.storage, staging, sibling)?;
            let size = old.size().min(ctx.size(&sibling) + self.reindex_slack);
            let mut data = staging.reachability_required(&self.storage, &sibling)?;
            data.interval = Interval::new(rcursor - size + 1, rcursor);
            staging.stage_reachability(sibling, data);
            ctx.propagate_interval(&self.storage, staging, sibling)?;
            rcursor -= size;
        }

        let mut data = staging.reachability_required(&self.storage, &chosen)?;
        debug_assert!(chosen_start <= data.interval.start && data.interval.end <= rcursor);
        data.interval = Interval::new(chosen_start, rcursor);
        staging.stage_reachability(chosen, data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::Database;
    use tempfile::TempDir;

    fn hash(n: u64) -> Hash {
        Hash::from_le_u64([n, 0, 0, 0])
    }

    fn setup(depth: u64, slack: u64) -> (TempDir, ReachabilityManager, Arc<ConsensusStorage>) {
        let tmp = TempDir::new().unwrap();
        let storage = Arc::new(ConsensusStorage::new(Arc::new(Database::open(tmp.path()).unwrap())));
        let manager = ReachabilityManager::with_params(storage.clone(), depth, slack);
        (tmp, manager, storage)
    }

    #[test]
    fn genesis_owns_the_maximal_interval() {
        let (_tmp, manager, storage) = setup(100, 1 << 12);
        let mut staging = StagingArea::new();
        manager.init(&mut staging, hash(0)).unwrap();
        staging.commit(&storage).unwrap();

        let data = storage.reachability.get(&hash(0)).unwrap().unwrap();
        assert_eq!(data.interval, Interval::maximal());
        assert_eq!(storage.metadata.reindex_root().unwrap(), Some(hash(0)));
    }

    #[test]
    fn chain_ancestry_via_interval_containment() {
        let (_tmp, manager, storage) = setup(100, 1 << 12);
        let mut staging = StagingArea::new();
        manager.init(&mut staging, hash(0)).unwrap();
        for i in 1..=5u64 {
            manager.add_block(&mut staging, hash(i), hash(i - 1)).unwrap();
        }
        // A fork off block 2
        manager.add_block(&mut staging, hash(100), hash(2)).unwrap();
        staging.commit(&storage).unwrap();

        let staging = StagingArea::new();
        for i in 0..=5u64 {
            assert!(manager.is_chain_ancestor_of(&staging, hash(i), hash(5)).unwrap(), "block {i}");
        }
        assert!(manager.is_chain_ancestor_of(&staging, hash(3), hash(3)).unwrap());
        assert!(!manager.is_chain_ancestor_of(&staging, hash(5), hash(3)).unwrap());
        assert!(manager.is_chain_ancestor_of(&staging, hash(2), hash(100)).unwrap());
        assert!(!manager.is_chain_ancestor_of(&staging, hash(3), hash(100)).unwrap());
        assert!(!manager.is_chain_ancestor_of(&staging, hash(100), hash(5)).unwrap());
    }

    #[test]
    fn deep_chain_forces_reindex_and_stays_correct() {
        // Tiny slack so the 64-bit space exhausts after a few halvings
        let (_tmp, manager, storage) = setup(8, 16);
        let mut staging = StagingArea::new();
        manager.init(&mut staging, hash(0)).unwrap();

        let depth = 300u64;
        for i in 1..=depth {
            manager.add_block(&mut staging, hash(i), hash(i - 1)).unwrap();
            manager.try_advancing_reindex_root(&mut staging, hash(i)).unwrap();
        }
        staging.commit(&storage).unwrap();

        let staging = StagingArea::new();
        for i in (0..depth).step_by(17) {
            assert!(manager.is_chain_ancestor_of(&staging, hash(i), hash(depth)).unwrap(), "ancestor {i}");
            assert!(!manager.is_chain_ancestor_of(&staging, hash(depth), hash(i)).unwrap());
        }
        // The root must have advanced off genesis
        let root = storage.metadata.reindex_root().unwrap().unwrap();
        assert_ne!(root, hash(0));
    }

    #[test]
    fn sibling_forks_survive_reindexing() {
        let (_tmp, manager, storage) = setup(4, 8);
        let mut staging = StagingArea::new();
        manager.init(&mut staging, hash(0)).unwrap();

        // A spine with a fork at every block
        let spine = 120u64;
        for i in 1..=spine {
            manager.add_block(&mut staging, hash(i), hash(i - 1)).unwrap();
            manager.add_block(&mut staging, hash(1000 + i), hash(i - 1)).unwrap();
            manager.try_advancing_reindex_root(&mut staging, hash(i)).unwrap();
        }
        staging.commit(&storage).unwrap();

        let staging = StagingArea::new();
        for i in 1..=spine {
            // Fork children hang off block i-1: ancestors of the fork are
            // exactly the spine up to i-1
            assert!(manager.is_chain_ancestor_of(&staging, hash(i - 1), hash(1000 + i)).unwrap());
            assert!(!manager.is_chain_ancestor_of(&staging, hash(i), hash(1000 + i)).unwrap());
            assert!(!manager.is_chain_ancestor_of(&staging, hash(1000 + i), hash(spine)).unwrap());
        }
    }
}
