//! The consensus orchestrator
//!
//! [`Consensus`] owns the whole engine: it wires the managers over one
//! storage handle, seeds genesis, serializes writers behind a process-wide
//! lock, and exposes the public query surface. Readers run against
//! committed state and the latest virtual snapshot and never observe an
//! in-flight staging area.

pub mod dag;
pub mod difficulty;
pub mod ghostdag;
pub mod types;
pub mod validation;

use crate::pipeline::{HeaderProcessor, VirtualProcessor};
use crate::process::mining::{BlockTemplate, BlockTemplateBuilder};
use crate::process::past_median_time::PastMedianTimeManager;
use crate::process::sync::SyncManager;
use crate::unix_now_ms;
use consensus_core::block::Block;
use consensus_core::config::params::Params;
use consensus_core::mass::MassCalculator;
use consensus_core::script::{PermissiveScriptEngine, ScriptEngine};
use consensus_core::status::BlockStatus;
use consensus_core::tx::{ScriptPublicKey, Transaction};
use consensus_core::Hash;
use dag::{DagTopology, ReachabilityManager, RelationsService};
use database::{ConsensusStorage, Database, StagingArea};
use difficulty::DifficultyManager;
use ghostdag::GhostdagManager;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use types::{BlockInfo, ConsensusError, ConsensusResult, RejectReason, SyncInfo, VirtualState};
use validation::{BlockValidator, HeaderValidator};

/// A node is considered synced when its selected tip is at most this far
/// behind wall clock
const SYNCED_MAX_TIP_AGE_MS: u64 = 10 * 60 * 1000;

pub struct Consensus {
    params: Params,
    storage: Arc<ConsensusStorage>,
    header_processor: HeaderProcessor,
    virtual_processor: VirtualProcessor,
    block_validator: BlockValidator,
    sync_manager: SyncManager,
    template_builder: BlockTemplateBuilder,
    mass_calculator: MassCalculator,
    reachability: Arc<ReachabilityManager>,

    /// Snapshot of the virtual block; swapped atomically after each commit
    virtual_state: RwLock<Arc<VirtualState>>,
    /// The process-wide consensus write lock: one `submit_block` at a time
    submit_lock: Mutex<()>,
    is_ibd_running: AtomicBool,
}

impl Consensus {
    pub fn new(db: Arc<Database>, params: Params) -> ConsensusResult<Arc<Self>> {
        Self::with_script_engine(db, params, Arc::new(PermissiveScriptEngine))
    }

    pub fn with_script_engine(
        db: Arc<Database>,
        params: Params,
        script_engine: Arc<dyn ScriptEngine>,
    ) -> ConsensusResult<Arc<Self>> {
        let storage = Arc::new(ConsensusStorage::new(db));
        let genesis_hash = params.genesis.hash();

        let relations = Arc::new(RelationsService::new(storage.clone()));
        let reachability = Arc::new(ReachabilityManager::new(storage.clone()));
        let topology = Arc::new(DagTopology::new(storage.clone(), relations.clone(), reachability.clone()));
        let ghostdag = Arc::new(GhostdagManager::new(
            params.ghostdag_k,
            genesis_hash,
            params.mergeset_size_limit,
            storage.clone(),
            topology.clone(),
        ));
        let difficulty = Arc::new(DifficultyManager::new(
            params.genesis.bits,
            params.difficulty_window_size,
            params.target_time_per_block,
            storage.clone(),
        ));
        let past_median_time = Arc::new(PastMedianTimeManager::new(params.past_median_time_window_size, storage.clone()));
        let validator = Arc::new(HeaderValidator::new(params.max_block_parents, params.max_block_time_offset, storage.clone()));

        let header_processor = HeaderProcessor::new(
            validator,
            relations.clone(),
            reachability.clone(),
            ghostdag.clone(),
            difficulty.clone(),
            past_median_time.clone(),
        );
        let virtual_processor = VirtualProcessor::new(ghostdag, difficulty, past_median_time, reachability.clone());
        let mass_calculator = MassCalculator::from(&params);
        let block_validator = BlockValidator::new(mass_calculator.clone(), params.max_block_mass, script_engine);
        let sync_manager = SyncManager::new(storage.clone(), reachability.clone());
        let template_builder = BlockTemplateBuilder::new(storage.clone());

        let consensus = Self {
            params,
            storage,
            header_processor,
            virtual_processor,
            block_validator,
            sync_manager,
            template_builder,
            mass_calculator,
            reachability,
            virtual_state: RwLock::new(Arc::new(VirtualState {
                parents: vec![genesis_hash],
                ghostdag_data: database::stores::GhostdagData::new_genesis(),
                daa_score: 0,
                bits: 0,
                past_median_time: 0,
            })),
            submit_lock: Mutex::new(()),
            is_ibd_running: AtomicBool::new(false),
        };

        consensus.init_genesis(genesis_hash)?;
        consensus.init_virtual()?;
        Ok(Arc::new(consensus))
    }

    /// Seeds the stores with the network genesis on first start
    fn init_genesis(&self, genesis_hash: Hash) -> ConsensusResult<()> {
        if self.storage.statuses.get(&genesis_hash)?.is_some() {
            return Ok(());
        }

        let genesis_block = self.params.genesis.build_block();
        let mut staging = StagingArea::new();
        staging.stage_header(genesis_hash, Arc::new(genesis_block.header.clone()));
        staging.stage_relations(genesis_hash, database::stores::BlockRelations::new(vec![]));
        staging.stage_ghostdag(genesis_hash, database::stores::GhostdagData::new_genesis());
        self.reachability.init(&mut staging, genesis_hash)?;
        staging.stage_status(genesis_hash, BlockStatus::Valid);
        staging.stage_pruning_point(genesis_hash);
        staging.bump_header_count();
        staging.bump_block_count();
        staging.commit(&self.storage)?;

        info!(%genesis_hash, network = self.params.network_name, "genesis block initialized");
        Ok(())
    }

    /// Recovers the tip set and computes the initial virtual state
    fn init_virtual(&self) -> ConsensusResult<()> {
        let tips = self.storage.relations.tips()?;
        let mut staging = StagingArea::new();
        let state = self.virtual_processor.update_virtual(&mut staging, tips)?;
        staging.commit(&self.storage)?;
        *self.virtual_state.write() = Arc::new(state);
        Ok(())
    }

    /// Full submission pipeline: validate, stage, commit, refresh the
    /// virtual. Rejected blocks leave the store untouched except for the
    /// persisted `Invalid` verdict on rule violations.
    pub fn submit_block(&self, block: Block) -> Result<(), RejectReason> {
        if self.is_ibd_running.load(Ordering::SeqCst) {
            return Err(RejectReason::InIbd);
        }
        self.validate_and_insert_block(block)
    }

    /// Same pipeline without the IBD gate; used by the sync path itself
    pub fn validate_and_insert_block(&self, block: Block) -> Result<(), RejectReason> {
        let hash = block.hash();
        let _guard = self.submit_lock.lock();

        match self.storage.statuses.get(&hash).map_err(|e| RejectReason::Internal(e.to_string()))? {
            Some(BlockStatus::Invalid) => return Err(RejectReason::KnownInvalid),
            Some(_) => return Err(RejectReason::Duplicate),
            None => {}
        }

        match self.process_block_inner(&block) {
            Ok(()) => Ok(()),
            Err(err) => {
                let reject = RejectReason::from(err);
                if matches!(
                    reject,
                    RejectReason::RuleViolation(_)
                        | RejectReason::PowInvalid
                        | RejectReason::MerkleMismatch
                        | RejectReason::InvalidTransactions(_)
                ) {
                    // Persist the verdict so the block cannot be resubmitted
                    self.mark_invalid(hash);
                }
                warn!(%hash, reason = %reject, "block rejected");
                Err(reject)
            }
        }
    }

    fn process_block_inner(&self, block: &Block) -> ConsensusResult<()> {
        let hash = block.hash();
        let header = Arc::new(block.header.clone());
        let mut staging = StagingArea::new();

        self.header_processor.process_header(&mut staging, &header)?;

        if block.is_header_only() {
            staging.stage_status(hash, BlockStatus::HeaderOnly);
        } else {
            self.block_validator.validate_body_in_isolation(block)?;
            // A body over bodiless parents cannot progress yet; the block
            // is accepted but stays header-only
            let mut parents_have_bodies = true;
            for parent in block.header.direct_parents() {
                let status = staging
                    .status(&self.storage, parent)?
                    .ok_or_else(|| ConsensusError::DataCorruption(format!("validated parent {parent} has no status")))?;
                if !status.has_block_body() {
                    parents_have_bodies = false;
                    break;
                }
            }
            if parents_have_bodies {
                staging.stage_status(hash, BlockStatus::Valid);
                staging.bump_block_count();
            } else {
                staging.stage_status(hash, BlockStatus::HeaderOnly);
            }
        }

        // The new block replaces whichever of its parents were tips
        let current = self.virtual_state.read().clone();
        let mut tips: Vec<Hash> =
            current.parents.iter().copied().filter(|tip| !block.header.direct_parents().contains(tip)).collect();
        tips.push(hash);

        let new_state = self.virtual_processor.update_virtual(&mut staging, tips)?;
        staging.commit(&self.storage)?;
        *self.virtual_state.write() = Arc::new(new_state);

        info!(%hash, blue_score = header.blue_score, "block accepted");
        Ok(())
    }

    fn mark_invalid(&self, hash: Hash) {
        let mut staging = StagingArea::new();
        staging.stage_status(hash, BlockStatus::Invalid);
        if let Err(err) = staging.commit(&self.storage) {
            warn!(%hash, %err, "failed to persist invalid verdict");
        }
    }

    // -- read surface --

    pub fn get_block_info(&self, hash: Hash) -> ConsensusResult<Option<BlockInfo>> {
        let Some(status) = self.storage.statuses.get(&hash)? else {
            return Ok(None);
        };
        if status == BlockStatus::Invalid {
            // Invalid blocks carry only their verdict, no consensus data
            return Ok(Some(BlockInfo {
                hash,
                status,
                blue_score: 0,
                blue_work: Default::default(),
                selected_parent: None,
                mergeset_blues: vec![],
                mergeset_reds: vec![],
            }));
        }
        let data = self
            .storage
            .ghostdag
            .get(&hash)?
            .ok_or_else(|| ConsensusError::DataCorruption(format!("status without ghostdag data for {hash}")))?;
        Ok(Some(BlockInfo {
            hash,
            status,
            blue_score: data.blue_score,
            blue_work: data.blue_work,
            selected_parent: data.selected_parent,
            mergeset_blues: data.mergeset_blues.clone(),
            mergeset_reds: data.mergeset_reds.clone(),
        }))
    }

    pub fn get_block_relations(&self, hash: Hash) -> ConsensusResult<Option<(Vec<Hash>, Vec<Hash>)>> {
        Ok(self.storage.relations.get(&hash)?.map(|relations| (relations.parents, relations.children)))
    }

    /// True iff `hash` lies on the virtual's selected-parent chain
    pub fn is_chain_block(&self, hash: Hash) -> ConsensusResult<bool> {
        if self.storage.statuses.get(&hash)?.is_none() {
            return Ok(false);
        }
        let Some(selected_tip) = self.virtual_state.read().selected_parent() else {
            return Ok(false);
        };
        let staging = StagingArea::new();
        self.reachability.is_chain_ancestor_of(&staging, hash, selected_tip)
    }

    pub fn build_block_locator(&self, low: Hash, high: Hash) -> ConsensusResult<Vec<Hash>> {
        self.sync_manager.build_block_locator(low, high)
    }

    pub fn get_sync_info(&self) -> ConsensusResult<SyncInfo> {
        let header_count = self.sync_manager.header_count()?;
        let block_count = self.sync_manager.block_count()?;
        let is_synced = !self.is_ibd_running.load(Ordering::SeqCst) && self.tip_age_within(SYNCED_MAX_TIP_AGE_MS)?;
        Ok(SyncInfo { header_count, block_count, is_synced })
    }

    fn tip_age_within(&self, max_age_ms: u64) -> ConsensusResult<bool> {
        let Some(selected_tip) = self.virtual_state.read().selected_parent() else {
            return Ok(false);
        };
        let header = self
            .storage
            .headers
            .get(&selected_tip)?
            .ok_or_else(|| ConsensusError::DataCorruption(format!("missing header for selected tip {selected_tip}")))?;
        Ok(unix_now_ms().saturating_sub(header.timestamp) <= max_age_ms)
    }

    /// Computes a transaction's mass and stores it on the transaction
    pub fn populate_mass(&self, tx: &Transaction) {
        self.mass_calculator.populate_mass(tx);
    }

    pub fn build_block_template(
        &self,
        miner_script: ScriptPublicKey,
        extra_data: Vec<u8>,
        transactions: Vec<Transaction>,
    ) -> ConsensusResult<BlockTemplate> {
        let state = self.virtual_state.read().clone();
        self.template_builder.build_block_template(&state, miner_script, extra_data, transactions)
    }

    pub fn virtual_state(&self) -> Arc<VirtualState> {
        self.virtual_state.read().clone()
    }

    pub fn set_ibd_running(&self, running: bool) {
        self.is_ibd_running.store(running, Ordering::SeqCst);
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

pub use types::*;
