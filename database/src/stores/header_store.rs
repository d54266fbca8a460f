use crate::cache::LruCache;
use crate::db::CF_HEADERS;
use crate::{Database, DbResult};
use consensus_core::header::Header;
use consensus_core::Hash;
use std::sync::Arc;

pub struct HeaderStore {
    db: Arc<Database>,
    cache: LruCache<Hash, Arc<Header>>,
}

impl HeaderStore {
    pub fn new(db: Arc<Database>, cache_size: usize) -> Self {
        Self { db, cache: LruCache::new(cache_size) }
    }

    pub fn get(&self, hash: &Hash) -> DbResult<Option<Arc<Header>>> {
        if let Some(header) = self.cache.get(hash) {
            return Ok(Some(header));
        }
        match self.db.get(CF_HEADERS, hash.as_bytes())? {
            Some(bytes) => {
                let header: Arc<Header> = Arc::new(bincode::deserialize(&bytes)?);
                self.cache.insert(*hash, header.clone());
                Ok(Some(header))
            }
            None => Ok(None),
        }
    }

    pub fn has(&self, hash: &Hash) -> DbResult<bool> {
        if self.cache.get(hash).is_some() {
            return Ok(true);
        }
        self.db.exists(CF_HEADERS, hash.as_bytes())
    }

    pub(crate) fn stage_into_batch(&self, batch: &mut rocksdb::WriteBatch, hash: &Hash, header: &Header) -> DbResult<()> {
        self.db.batch_put(batch, CF_HEADERS, hash.as_bytes(), &bincode::serialize(header)?)
    }

    pub(crate) fn update_cache(&self, hash: Hash, header: Arc<Header>) {
        self.cache.insert(hash, header);
    }
}
