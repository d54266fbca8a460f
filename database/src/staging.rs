//! The staging area
//!
//! One staging area exists per in-flight validation batch. It collects
//! every write a validation produces (header, relations, GHOSTDAG data,
//! reachability nodes, statuses, metadata) as an in-memory overlay over the
//! committed stores. Reads through the area see staged values first.
//! `commit` turns the overlay into a single atomic write batch; dropping
//! the area discards it with no effect on the store.

use crate::stores::metadata_store::{KEY_BLOCK_COUNT, KEY_HEADER_COUNT, KEY_PRUNING_POINT, KEY_REINDEX_ROOT};
use crate::stores::{BlockRelations, ConsensusStorage, GhostdagData, ReachabilityData};
use crate::{DbError, DbResult};
use consensus_core::header::Header;
use consensus_core::status::BlockStatus;
use consensus_core::{BlockHashMap, Hash};
use std::sync::Arc;

#[derive(Default)]
pub struct StagingArea {
    headers: BlockHashMap<Arc<Header>>,
    ghostdag: BlockHashMap<Arc<GhostdagData>>,
    reachability: BlockHashMap<ReachabilityData>,
    relations: BlockHashMap<BlockRelations>,
    statuses: BlockHashMap<BlockStatus>,
    reindex_root: Option<Hash>,
    pruning_point: Option<Hash>,
    header_count_delta: u64,
    block_count_delta: u64,
}

impl StagingArea {
    pub fn new() -> Self {
        Self::default()
    }

    // -- staged-first reads --

    pub fn header(&self, store: &ConsensusStorage, hash: &Hash) -> DbResult<Option<Arc<Header>>> {
        match self.headers.get(hash) {
            Some(header) => Ok(Some(header.clone())),
            None => store.headers.get(hash),
        }
    }

    pub fn has_header(&self, store: &ConsensusStorage, hash: &Hash) -> DbResult<bool> {
        Ok(self.headers.contains_key(hash) || store.headers.has(hash)?)
    }

    pub fn ghostdag(&self, store: &ConsensusStorage, hash: &Hash) -> DbResult<Option<Arc<GhostdagData>>> {
        match self.ghostdag.get(hash) {
            Some(data) => Ok(Some(data.clone())),
            None => store.ghostdag.get(hash),
        }
    }

    /// GHOSTDAG data that must exist; absence means our own indexes are
    /// inconsistent
    pub fn ghostdag_required(&self, store: &ConsensusStorage, hash: &Hash) -> DbResult<Arc<GhostdagData>> {
        self.ghostdag(store, hash)?.ok_or_else(|| DbError::NotFound(format!("ghostdag-data/{hash}")))
    }

    pub fn reachability(&self, store: &ConsensusStorage, hash: &Hash) -> DbResult<Option<ReachabilityData>> {
        match self.reachability.get(hash) {
            Some(data) => Ok(Some(data.clone())),
            None => store.reachability.get(hash),
        }
    }

    pub fn reachability_required(&self, store: &ConsensusStorage, hash: &Hash) -> DbResult<ReachabilityData> {
        self.reachability(store, hash)?.ok_or_else(|| DbError::NotFound(format!("reachability-data/{hash}")))
    }

    pub fn has_reachability(&self, store: &ConsensusStorage, hash: &Hash) -> DbResult<bool> {
        Ok(self.reachability.contains_key(hash) || store.reachability.has(hash)?)
    }

    pub fn relations(&self, store: &ConsensusStorage, hash: &Hash) -> DbResult<Option<BlockRelations>> {
        match self.relations.get(hash) {
            Some(relations) => Ok(Some(relations.clone())),
            None => store.relations.get(hash),
        }
    }

    pub fn has_relations(&self, store: &ConsensusStorage, hash: &Hash) -> DbResult<bool> {
        Ok(self.relations.contains_key(hash) || store.relations.has(hash)?)
    }

    pub fn status(&self, store: &ConsensusStorage, hash: &Hash) -> DbResult<Option<BlockStatus>> {
        match self.statuses.get(hash) {
            Some(status) => Ok(Some(*status)),
            None => store.statuses.get(hash),
        }
    }

    pub fn reindex_root(&self, store: &ConsensusStorage) -> DbResult<Option<Hash>> {
        match self.reindex_root {
            Some(root) => Ok(Some(root)),
            None => store.metadata.reindex_root(),
        }
    }

    // -- staged writes --

    pub fn stage_header(&mut self, hash: Hash, header: Arc<Header>) {
        self.headers.insert(hash, header);
    }

    pub fn stage_ghostdag(&mut self, hash: Hash, data: GhostdagData) {
        self.ghostdag.insert(hash, Arc::new(data));
    }

    pub fn stage_reachability(&mut self, hash: Hash, data: ReachabilityData) {
        self.reachability.insert(hash, data);
    }

    pub fn stage_relations(&mut self, hash: Hash, relations: BlockRelations) {
        self.relations.insert(hash, relations);
    }

    pub fn stage_status(&mut self, hash: Hash, status: BlockStatus) {
        self.statuses.insert(hash, status);
    }

    pub fn stage_reindex_root(&mut self, root: Hash) {
        self.reindex_root = Some(root);
    }

    pub fn stage_pruning_point(&mut self, pruning_point: Hash) {
        self.pruning_point = Some(pruning_point);
    }

    pub fn bump_header_count(&mut self) {
        self.header_count_delta += 1;
    }

    pub fn bump_block_count(&mut self) {
        self.block_count_delta += 1;
    }

    /// Atomically writes the whole overlay to disk, then pushes the
    /// committed values through the store caches. Consumes the area:
    /// a staging area is either committed once or dropped.
    pub fn commit(self, store: &ConsensusStorage) -> DbResult<()> {
        let mut batch = store.new_batch();

        for (hash, header) in &self.headers {
            store.headers.stage_into_batch(&mut batch, hash, header)?;
        }
        for (hash, data) in &self.ghostdag {
            store.ghostdag.stage_into_batch(&mut batch, hash, data)?;
        }
        for (hash, data) in &self.reachability {
            store.reachability.stage_into_batch(&mut batch, hash, data)?;
        }
        for (hash, relations) in &self.relations {
            store.relations.stage_into_batch(&mut batch, hash, relations)?;
        }
        for (hash, status) in &self.statuses {
            store.statuses.stage_into_batch(&mut batch, hash, *status)?;
        }
        if let Some(root) = &self.reindex_root {
            store.metadata.stage_hash_into_batch(&mut batch, KEY_REINDEX_ROOT, root)?;
        }
        if let Some(pruning_point) = &self.pruning_point {
            store.metadata.stage_hash_into_batch(&mut batch, KEY_PRUNING_POINT, pruning_point)?;
        }
        if self.header_count_delta > 0 {
            let count = store.metadata.header_count()? + self.header_count_delta;
            store.metadata.stage_u64_into_batch(&mut batch, KEY_HEADER_COUNT, count)?;
        }
        if self.block_count_delta > 0 {
            let count = store.metadata.block_count()? + self.block_count_delta;
            store.metadata.stage_u64_into_batch(&mut batch, KEY_BLOCK_COUNT, count)?;
        }

        store.write_batch(batch)?;

        // Disk write succeeded; now the caches may observe the new state
        for (hash, header) in self.headers {
            store.headers.update_cache(hash, header);
        }
        for (hash, data) in self.ghostdag {
            store.ghostdag.update_cache(hash, data);
        }
        for (hash, data) in self.reachability {
            store.reachability.update_cache(hash, data);
        }
        for (hash, relations) in self.relations {
            store.relations.update_cache(hash, relations);
        }
        for (hash, status) in self.statuses {
            store.statuses.update_cache(hash, status);
        }

        Ok(())
    }
}
