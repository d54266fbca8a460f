use crate::cache::LruCache;
use crate::db::CF_RELATIONS;
use crate::{Database, DbResult};
use consensus_core::Hash;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Parent and child edges of one block. Children accumulate as descendants
/// arrive; parents are immutable after acceptance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRelations {
    pub parents: Vec<Hash>,
    pub children: Vec<Hash>,
}

impl BlockRelations {
    pub fn new(parents: Vec<Hash>) -> Self {
        Self { parents, children: Vec::new() }
    }
}

pub struct RelationsStore {
    db: Arc<Database>,
    cache: LruCache<Hash, BlockRelations>,
}

impl RelationsStore {
    pub fn new(db: Arc<Database>, cache_size: usize) -> Self {
        Self { db, cache: LruCache::new(cache_size) }
    }

    pub fn get(&self, hash: &Hash) -> DbResult<Option<BlockRelations>> {
        if let Some(relations) = self.cache.get(hash) {
            return Ok(Some(relations));
        }
        match self.db.get(CF_RELATIONS, hash.as_bytes())? {
            Some(bytes) => {
                let relations: BlockRelations = bincode::deserialize(&bytes)?;
                self.cache.insert(*hash, relations.clone());
                Ok(Some(relations))
            }
            None => Ok(None),
        }
    }

    pub fn has(&self, hash: &Hash) -> DbResult<bool> {
        if self.cache.get(hash).is_some() {
            return Ok(true);
        }
        self.db.exists(CF_RELATIONS, hash.as_bytes())
    }

    /// Scans the whole bucket for blocks without children. Used once at
    /// startup to recover the DAG tips; the live tip set is maintained in
    /// memory afterwards.
    pub fn tips(&self) -> DbResult<Vec<Hash>> {
        let mut tips = Vec::new();
        for entry in self.db.iterator(crate::db::CF_RELATIONS, rocksdb::IteratorMode::Start)? {
            let (key, value) = entry.map_err(crate::errors::DbError::from)?;
            let relations: BlockRelations = bincode::deserialize(&value)?;
            if relations.children.is_empty() {
                let hash = Hash::try_from_slice(&key)
                    .map_err(|_| crate::errors::DbError::Corruption("bad hash width in relations key".into()))?;
                tips.push(hash);
            }
        }
        Ok(tips)
    }

    pub(crate) fn stage_into_batch(&self, batch: &mut rocksdb::WriteBatch, hash: &Hash, relations: &BlockRelations) -> DbResult<()> {
        self.db.batch_put(batch, CF_RELATIONS, hash.as_bytes(), &bincode::serialize(relations)?)
    }

    pub(crate) fn update_cache(&self, hash: Hash, relations: BlockRelations) {
        self.cache.insert(hash, relations);
    }
}
