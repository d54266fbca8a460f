use crate::cache::LruCache;
use crate::db::CF_REACHABILITY;
use crate::{Database, DbResult};
use consensus_core::Hash;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A closed interval `[start, end]` of u64 positions. Empty when
/// `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: u64,
    pub end: u64,
}

impl Interval {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// An empty marker interval for nodes awaiting allocation
    pub fn empty() -> Self {
        Self { start: 1, end: 0 }
    }

    /// The maximal allocatable interval. The edges are reserved so that
    /// arithmetic on neighbors never wraps.
    pub fn maximal() -> Self {
        Self { start: 1, end: u64::MAX - 1 }
    }

    pub fn size(&self) -> u64 {
        if self.start > self.end {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Containment is inclusive: every interval contains itself
    pub fn contains(&self, other: Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Per-block node of the selected-parent tree index.
///
/// A block A is a chain ancestor of B iff A's interval contains B's.
/// Nodes are never deleted; intervals are reassigned during reindexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachabilityData {
    pub interval: Interval,
    /// Tree parent, i.e. the block's selected parent; the zero hash marks
    /// the tree root (genesis)
    pub parent: Hash,
    pub children: Vec<Hash>,
    /// Depth in the tree; genesis is 0
    pub height: u64,
}

impl ReachabilityData {
    pub fn new(interval: Interval, parent: Hash, height: u64) -> Self {
        Self { interval, parent, children: Vec::new(), height }
    }
}

pub struct ReachabilityStore {
    db: Arc<Database>,
    cache: LruCache<Hash, ReachabilityData>,
}

impl ReachabilityStore {
    pub fn new(db: Arc<Database>, cache_size: usize) -> Self {
        Self { db, cache: LruCache::new(cache_size) }
    }

    pub fn get(&self, hash: &Hash) -> DbResult<Option<ReachabilityData>> {
        if let Some(data) = self.cache.get(hash) {
            return Ok(Some(data));
        }
        match self.db.get(CF_REACHABILITY, hash.as_bytes())? {
            Some(bytes) => {
                let data: ReachabilityData = bincode::deserialize(&bytes)?;
                self.cache.insert(*hash, data.clone());
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    pub fn has(&self, hash: &Hash) -> DbResult<bool> {
        if self.cache.get(hash).is_some() {
            return Ok(true);
        }
        self.db.exists(CF_REACHABILITY, hash.as_bytes())
    }

    pub(crate) fn stage_into_batch(&self, batch: &mut rocksdb::WriteBatch, hash: &Hash, data: &ReachabilityData) -> DbResult<()> {
        self.db.batch_put(batch, CF_REACHABILITY, hash.as_bytes(), &bincode::serialize(data)?)
    }

    pub(crate) fn update_cache(&self, hash: Hash, data: ReachabilityData) {
        self.cache.insert(hash, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_size_and_containment() {
        let outer = Interval::new(10, 100);
        let inner = Interval::new(20, 30);
        assert!(outer.contains(inner));
        assert!(!inner.contains(outer));
        assert!(outer.contains(outer));
        assert_eq!(inner.size(), 11);
        assert_eq!(Interval::empty().size(), 0);
        assert!(Interval::empty().is_empty());
    }

    #[test]
    fn serialization_roundtrip() {
        let mut data = ReachabilityData::new(Interval::new(5, 500), Hash::from_le_u64([1, 0, 0, 0]), 3);
        data.children = vec![Hash::from_le_u64([2, 0, 0, 0]), Hash::from_le_u64([3, 0, 0, 0])];
        let bytes = bincode::serialize(&data).unwrap();
        let decoded: ReachabilityData = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, data);
    }
}
