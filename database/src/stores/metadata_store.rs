use crate::db::CF_METADATA;
use crate::errors::DbError;
use crate::{Database, DbResult};
use consensus_core::Hash;
use std::sync::Arc;

pub const KEY_PRUNING_POINT: &[u8] = b"pruning-point";
pub const KEY_REINDEX_ROOT: &[u8] = b"reachability-reindex-root";
pub const KEY_HEADER_COUNT: &[u8] = b"header-count";
pub const KEY_BLOCK_COUNT: &[u8] = b"block-count";

/// Singleton consensus entries: pruning point, the cached reachability
/// reindex root, and block counters
pub struct MetadataStore {
    db: Arc<Database>,
}

impl MetadataStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn get_hash(&self, key: &[u8]) -> DbResult<Option<Hash>> {
        match self.db.get(CF_METADATA, key)? {
            Some(bytes) => Ok(Some(
                Hash::try_from_slice(&bytes)
                    .map_err(|_| DbError::Corruption(format!("bad hash width under {}", String::from_utf8_lossy(key))))?,
            )),
            None => Ok(None),
        }
    }

    fn get_u64(&self, key: &[u8]) -> DbResult<u64> {
        match self.db.get(CF_METADATA, key)? {
            Some(bytes) => {
                let array: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| DbError::Corruption(format!("bad counter width under {}", String::from_utf8_lossy(key))))?;
                Ok(u64::from_le_bytes(array))
            }
            None => Ok(0),
        }
    }

    pub fn pruning_point(&self) -> DbResult<Option<Hash>> {
        self.get_hash(KEY_PRUNING_POINT)
    }

    pub fn reindex_root(&self) -> DbResult<Option<Hash>> {
        self.get_hash(KEY_REINDEX_ROOT)
    }

    pub fn header_count(&self) -> DbResult<u64> {
        self.get_u64(KEY_HEADER_COUNT)
    }

    pub fn block_count(&self) -> DbResult<u64> {
        self.get_u64(KEY_BLOCK_COUNT)
    }

    pub(crate) fn stage_hash_into_batch(&self, batch: &mut rocksdb::WriteBatch, key: &[u8], hash: &Hash) -> DbResult<()> {
        self.db.batch_put(batch, CF_METADATA, key, hash.as_bytes())
    }

    pub(crate) fn stage_u64_into_batch(&self, batch: &mut rocksdb::WriteBatch, key: &[u8], value: u64) -> DbResult<()> {
        self.db.batch_put(batch, CF_METADATA, key, &value.to_le_bytes())
    }
}
