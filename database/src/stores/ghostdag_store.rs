use crate::cache::LruCache;
use crate::db::CF_GHOSTDAG;
use crate::{Database, DbResult};
use consensus_core::{BlueWorkType, Hash, KType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Per-block GHOSTDAG output, owned by the store.
///
/// `selected_parent` is `None` only for genesis and is always the first
/// element of `mergeset_blues` otherwise. A `BTreeMap` keeps the anticone
/// sizes deterministically encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostdagData {
    pub blue_score: u64,
    pub blue_work: BlueWorkType,
    pub selected_parent: Option<Hash>,
    pub mergeset_blues: Vec<Hash>,
    pub mergeset_reds: Vec<Hash>,
    pub blues_anticone_sizes: BTreeMap<Hash, KType>,
}

impl GhostdagData {
    /// Data for a block with no parents
    pub fn new_genesis() -> Self {
        Self {
            blue_score: 0,
            blue_work: BlueWorkType::ZERO,
            selected_parent: None,
            mergeset_blues: Vec::new(),
            mergeset_reds: Vec::new(),
            blues_anticone_sizes: BTreeMap::new(),
        }
    }

    /// Fresh data seeded with the chosen selected parent, which starts as
    /// the first blue of the merge set with an empty anticone
    pub fn new_with_selected_parent(selected_parent: Hash) -> Self {
        let mut data = Self::new_genesis();
        data.selected_parent = Some(selected_parent);
        data.mergeset_blues.push(selected_parent);
        data.blues_anticone_sizes.insert(selected_parent, 0);
        data
    }

    pub fn mergeset_size(&self) -> u64 {
        (self.mergeset_blues.len() + self.mergeset_reds.len()) as u64
    }

    /// Merge set in the order it was classified (blues then reds)
    pub fn mergeset_iter(&self) -> impl Iterator<Item = Hash> + '_ {
        self.mergeset_blues.iter().chain(self.mergeset_reds.iter()).copied()
    }
}

pub struct GhostdagStore {
    db: Arc<Database>,
    cache: LruCache<Hash, Arc<GhostdagData>>,
}

impl GhostdagStore {
    pub fn new(db: Arc<Database>, cache_size: usize) -> Self {
        Self { db, cache: LruCache::new(cache_size) }
    }

    pub fn get(&self, hash: &Hash) -> DbResult<Option<Arc<GhostdagData>>> {
        if let Some(data) = self.cache.get(hash) {
            return Ok(Some(data));
        }
        match self.db.get(CF_GHOSTDAG, hash.as_bytes())? {
            Some(bytes) => {
                let data: Arc<GhostdagData> = Arc::new(bincode::deserialize(&bytes)?);
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
        self.db.exists(CF_GHOSTDAG, hash.as_bytes())
    }

    pub(crate) fn stage_into_batch(&self, batch: &mut rocksdb::WriteBatch, hash: &Hash, data: &GhostdagData) -> DbResult<()> {
        self.db.batch_put(batch, CF_GHOSTDAG, hash.as_bytes(), &bincode::serialize(data)?)
    }

    pub(crate) fn update_cache(&self, hash: Hash, data: Arc<GhostdagData>) {
        self.cache.insert(hash, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_roundtrip() {
        let mut data = GhostdagData::new_with_selected_parent(Hash::from_le_u64([1, 0, 0, 0]));
        data.blue_score = 10;
        data.blue_work = 12345u64.into();
        data.mergeset_blues.push(Hash::from_le_u64([2, 0, 0, 0]));
        data.mergeset_reds.push(Hash::from_le_u64([3, 0, 0, 0]));
        data.blues_anticone_sizes.insert(Hash::from_le_u64([2, 0, 0, 0]), 1);

        let bytes = bincode::serialize(&data).unwrap();
        let decoded: GhostdagData = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, data);
        // Deterministic bytes: a re-encode is identical
        assert_eq!(bincode::serialize(&decoded).unwrap(), bytes);
    }

    #[test]
    fn selected_parent_leads_the_blues() {
        let sp = Hash::from_le_u64([9, 0, 0, 0]);
        let data = GhostdagData::new_with_selected_parent(sp);
        assert_eq!(data.selected_parent, Some(sp));
        assert_eq!(data.mergeset_blues[0], sp);
        assert_eq!(data.blues_anticone_sizes[&sp], 0);
        assert_eq!(data.mergeset_size(), 1);
    }
}
