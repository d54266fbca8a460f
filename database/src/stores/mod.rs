pub mod ghostdag_store;
pub mod header_store;
pub mod metadata_store;
pub mod reachability_store;
pub mod relations_store;
pub mod status_store;

pub use ghostdag_store::{GhostdagData, GhostdagStore};
pub use header_store::HeaderStore;
pub use metadata_store::MetadataStore;
pub use reachability_store::{Interval, ReachabilityData, ReachabilityStore};
pub use relations_store::{BlockRelations, RelationsStore};
pub use status_store::StatusStore;

use crate::{Database, DbResult};
use std::sync::Arc;

/// Aggregates the typed consensus stores over one database handle. The
/// storage layer exclusively owns every persisted entity; managers hold
/// only transient views.
pub struct ConsensusStorage {
    db: Arc<Database>,
    pub headers: HeaderStore,
    pub ghostdag: GhostdagStore,
    pub reachability: ReachabilityStore,
    pub relations: RelationsStore,
    pub statuses: StatusStore,
    pub metadata: MetadataStore,
}

impl ConsensusStorage {
    const HEADER_CACHE_SIZE: usize = 4096;
    const GHOSTDAG_CACHE_SIZE: usize = 4096;
    const REACHABILITY_CACHE_SIZE: usize = 16384;
    const RELATIONS_CACHE_SIZE: usize = 8192;
    const STATUS_CACHE_SIZE: usize = 16384;

    pub fn new(db: Arc<Database>) -> Self {
        Self {
            headers: HeaderStore::new(db.clone(), Self::HEADER_CACHE_SIZE),
            ghostdag: GhostdagStore::new(db.clone(), Self::GHOSTDAG_CACHE_SIZE),
            reachability: ReachabilityStore::new(db.clone(), Self::REACHABILITY_CACHE_SIZE),
            relations: RelationsStore::new(db.clone(), Self::RELATIONS_CACHE_SIZE),
            statuses: StatusStore::new(db.clone(), Self::STATUS_CACHE_SIZE),
            metadata: MetadataStore::new(db.clone()),
            db,
        }
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn new_batch(&self) -> rocksdb::WriteBatch {
        self.db.batch()
    }

    pub fn write_batch(&self, batch: rocksdb::WriteBatch) -> DbResult<()> {
        self.db.write_batch(batch)
    }
}
