use crate::consensus::types::ConsensusResult;
use consensus_core::Hash;
use database::stores::BlockRelations;
use database::{ConsensusStorage, StagingArea};
use std::sync::Arc;

/// Staged access to the parent/child edges of the DAG.
///
/// Parents are fixed at acceptance; children accumulate as descendants
/// arrive, so adding a block rewrites each parent's record through the
/// staging area.
pub struct RelationsService {
    storage: Arc<ConsensusStorage>,
}

impl RelationsService {
    pub fn new(storage: Arc<ConsensusStorage>) -> Self {
        Self { storage }
    }

    pub fn add_block(&self, staging: &mut StagingArea, hash: Hash, parents: Vec<Hash>) -> ConsensusResult<()> {
        for parent in &parents {
            let mut relations = staging.relations(&self.storage, parent)?.unwrap_or_default();
            if !relations.children.contains(&hash) {
                relations.children.push(hash);
            }
            staging.stage_relations(*parent, relations);
        }
        staging.stage_relations(hash, BlockRelations::new(parents));
        Ok(())
    }

    pub fn has(&self, staging: &StagingArea, hash: &Hash) -> ConsensusResult<bool> {
        Ok(staging.has_relations(&self.storage, hash)?)
    }

    pub fn parents(&self, staging: &StagingArea, hash: &Hash) -> ConsensusResult<Option<Vec<Hash>>> {
        Ok(staging.relations(&self.storage, hash)?.map(|relations| relations.parents))
    }

    pub fn children(&self, staging: &StagingArea, hash: &Hash) -> ConsensusResult<Option<Vec<Hash>>> {
        Ok(staging.relations(&self.storage, hash)?.map(|relations| relations.children))
    }
}
