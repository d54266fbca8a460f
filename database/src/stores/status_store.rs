use crate::cache::LruCache;
use crate::db::CF_BLOCK_STATUS;
use crate::errors::DbError;
use crate::{Database, DbResult};
use consensus_core::status::BlockStatus;
use consensus_core::Hash;
use std::sync::Arc;

/// Persists the validation state of every known block as a single byte
pub struct StatusStore {
    db: Arc<Database>,
    cache: LruCache<Hash, BlockStatus>,
}

impl StatusStore {
    pub fn new(db: Arc<Database>, cache_size: usize) -> Self {
        Self { db, cache: LruCache::new(cache_size) }
    }

    pub fn get(&self, hash: &Hash) -> DbResult<Option<BlockStatus>> {
        if let Some(status) = self.cache.get(hash) {
            return Ok(Some(status));
        }
        match self.db.get(CF_BLOCK_STATUS, hash.as_bytes())? {
            Some(bytes) => {
                let byte = *bytes.first().ok_or_else(|| DbError::Corruption(format!("empty status entry for {hash}")))?;
                let status = BlockStatus::from_u8(byte)
                    .ok_or_else(|| DbError::Corruption(format!("unknown status byte {byte} for {hash}")))?;
                self.cache.insert(*hash, status);
                Ok(Some(status))
            }
            None => Ok(None),
        }
    }

    pub fn has(&self, hash: &Hash) -> DbResult<bool> {
        if self.cache.get(hash).is_some() {
            return Ok(true);
        }
        self.db.exists(CF_BLOCK_STATUS, hash.as_bytes())
    }

    pub(crate) fn stage_into_batch(&self, batch: &mut rocksdb::WriteBatch, hash: &Hash, status: BlockStatus) -> DbResult<()> {
        self.db.batch_put(batch, CF_BLOCK_STATUS, hash.as_bytes(), &[status.to_u8()])
    }

    pub(crate) fn update_cache(&self, hash: Hash, status: BlockStatus) {
        self.cache.insert(hash, status);
    }
}
