//! Block template construction
//!
//! Builds a header skeleton over the current virtual state so a miner only
//! has to roll the nonce (and optionally refresh the timestamp). The PoW
//! state is derived from the pre-PoW hash once per template.

use crate::consensus::types::{ConsensusResult, VirtualState};
use crate::unix_now_ms;
use consensus_core::block::Block;
use consensus_core::constants::INITIAL_SUBSIDY;
use consensus_core::header::Header;
use consensus_core::merkle::calc_merkle_root;
use consensus_core::subnets::SUBNETWORK_ID_COINBASE;
use consensus_core::tx::{ScriptPublicKey, Transaction, TransactionOutput};
use consensus_core::ZERO_HASH;
use database::ConsensusStorage;
use std::sync::Arc;

/// A ready-to-mine block plus the precomputed mining state
pub struct BlockTemplate {
    pub block: Block,
}

impl BlockTemplate {
    /// The intermediate PoW state for this template; cloned hashers make
    /// the per-nonce cost a single short hash
    pub fn pow_state(&self) -> consensus_pow::State {
        consensus_pow::State::new(&self.block.header)
    }
}

pub struct BlockTemplateBuilder {
    storage: Arc<ConsensusStorage>,
}

impl BlockTemplateBuilder {
    pub fn new(storage: Arc<ConsensusStorage>) -> Self {
        Self { storage }
    }

    /// Assembles a template on top of the given virtual state. The
    /// consensus fields (bits, daa score, blue score, blue work) are
    /// filled from the virtual's GHOSTDAG view, which is exactly the view
    /// the new block will have.
    pub fn build_block_template(
        &self,
        virtual_state: &VirtualState,
        miner_script: ScriptPublicKey,
        extra_data: Vec<u8>,
        transactions: Vec<Transaction>,
    ) -> ConsensusResult<BlockTemplate> {
        let coinbase = Transaction::new(
            0,
            Vec::new(),
            vec![TransactionOutput::new(INITIAL_SUBSIDY, miner_script)],
            0,
            SUBNETWORK_ID_COINBASE,
            0,
            extra_data,
        );

        let mut all_transactions = vec![coinbase];
        all_transactions.extend(transactions);
        let hash_merkle_root = calc_merkle_root(all_transactions.iter().map(|tx| tx.id()));

        let pruning_point = self.storage.metadata.pruning_point()?.unwrap_or(ZERO_HASH);
        let timestamp = unix_now_ms().max(virtual_state.past_median_time + 1);

        let header = Header::new_finalized(
            consensus_core::constants::BLOCK_VERSION,
            vec![virtual_state.parents.clone()],
            hash_merkle_root,
            ZERO_HASH,
            ZERO_HASH,
            timestamp,
            virtual_state.bits,
            0,
            virtual_state.daa_score,
            virtual_state.ghostdag_data.blue_work,
            virtual_state.ghostdag_data.blue_score,
            pruning_point,
        );

        Ok(BlockTemplate { block: Block::new(header, all_transactions) })
    }
}
