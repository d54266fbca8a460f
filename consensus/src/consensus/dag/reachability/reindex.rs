use crate::consensus::types::ConsensusResult;
use consensus_core::{BlockHashMap, Hash};
use database::stores::Interval;
use database::{ConsensusStorage, StagingArea};

/// Transient state of one reindex operation: subtree sizes are computed
/// once per operation and memoized across the upward climb, so the total
/// counting work is linear in the final reindex target's subtree.
#[derive(Default)]
pub(super) struct ReindexContext {
    sizes: BlockHashMap<u64>,
}

impl ReindexContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self, hash: &Hash) -> u64 {
        self.sizes[hash]
    }

    /// Fills `sizes` for every node of `root`'s subtree. Already-counted
    /// subtrees are skipped, which keeps repeated calls along a climb
    /// linear overall.
    pub fn count_subtree_sizes(
        &mut self,
        storage: &ConsensusStorage,
        staging: &StagingArea,
        root: Hash,
    ) -> ConsensusResult<()> {
        if self.sizes.contains_key(&root) {
            return Ok(());
        }

        // Preorder pass collecting the uncounted region
        let mut order = vec![root];
        let mut index = 0;
        while index < order.len() {
            let node = order[index];
            index += 1;
            let data = staging.reachability_required(storage, &node)?;
            for child in data.children {
                if !self.sizes.contains_key(&child) {
                    order.push(child);
                }
            }
        }

        // Reverse pass: children always resolve before their parent
        for node in order.into_iter().rev() {
            let data = staging.reachability_required(storage, &node)?;
            let total = 1 + data.children.iter().map(|child| self.sizes[child]).sum::<u64>();
            self.sizes.insert(node, total);
        }
        Ok(())
    }

    /// Reassigns the intervals of `root`'s whole subtree inside `root`'s
    /// (unchanged) interval, proportionally to subtree sizes. Children are
    /// laid out in hash order, so repeating the operation on the same tree
    /// is idempotent. Proportional flooring leaves each node's rounding
    /// slack as a free tail after its last child.
    pub fn propagate_interval(
        &mut self,
        storage: &ConsensusStorage,
        staging: &mut StagingArea,
        root: Hash,
    ) -> ConsensusResult<()> {
        debug_assert!(self.sizes.contains_key(&root), "count_subtree_sizes must run first");

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let data = staging.reachability_required(storage, &node)?;
            if data.children.is_empty() {
                continue;
            }

            let mut children = data.children.clone();
            children.sort();

            // The node's own slot is its interval end; children divide the rest
            let available = Interval::new(data.interval.start, data.interval.end - 1);
            let capacity = available.size();
            let total: u64 = children.iter().map(|child| self.sizes[child]).sum();
            debug_assert!(capacity >= total, "reindex target was chosen to fit its subtree");

            let mut cursor = available.start;
            for child in children {
                let subtree = self.sizes[&child];
                let share = ((capacity as u128 * subtree as u128) / total as u128) as u64;
                let size = share.max(subtree);

                let mut child_data = staging.reachability_required(storage, &child)?;
                child_data.interval = Interval::new(cursor, cursor + size - 1);
                staging.stage_reachability(child, child_data);
                cursor += size;
                stack.push(child);
            }
        }
        Ok(())
    }
}
