use crate::{hashing, BlueWorkType, Hash, ZERO_HASH};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// A sealed block header.
///
/// `blue_score`, `blue_work` and `daa_score` are filled from GHOSTDAG output
/// by the validator and are not free parameters of the miner; `nonce` and
/// `timestamp` are zeroed when computing the pre-PoW hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    /// Cached hash of the sealed header. Kept first for readability in
    /// debug output; never serialized into the hash itself.
    pub hash: Hash,
    pub version: u16,
    /// Parents per block level; level 0 holds the direct parents
    pub parents_by_level: Vec<Vec<Hash>>,
    pub hash_merkle_root: Hash,
    pub accepted_id_merkle_root: Hash,
    pub utxo_commitment: Hash,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    pub bits: u32,
    pub nonce: u64,
    pub daa_score: u64,
    pub blue_work: BlueWorkType,
    pub blue_score: u64,
    pub pruning_point: Hash,
}

impl Header {
    #[allow(clippy::too_many_arguments)]
    pub fn new_finalized(
        version: u16,
        parents_by_level: Vec<Vec<Hash>>,
        hash_merkle_root: Hash,
        accepted_id_merkle_root: Hash,
        utxo_commitment: Hash,
        timestamp: u64,
        bits: u32,
        nonce: u64,
        daa_score: u64,
        blue_work: BlueWorkType,
        blue_score: u64,
        pruning_point: Hash,
    ) -> Self {
        let mut header = Self {
            hash: ZERO_HASH,
            version,
            parents_by_level,
            hash_merkle_root,
            accepted_id_merkle_root,
            utxo_commitment,
            timestamp,
            bits,
            nonce,
            daa_score,
            blue_work,
            blue_score,
            pruning_point,
        };
        header.finalize();
        header
    }

    /// Recomputes and caches the header hash. Must be called after any
    /// field mutation (e.g. a miner rolling the nonce).
    pub fn finalize(&mut self) {
        self.hash = hashing::header::hash(self);
    }

    pub fn direct_parents(&self) -> &[Hash] {
        if self.parents_by_level.is_empty() {
            &[]
        } else {
            &self.parents_by_level[0]
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.direct_parents().is_empty()
    }

    /// Builds a header from a precomputed hash. Used in tests where the
    /// hash is an arbitrary marker rather than a real digest.
    pub fn from_precomputed_hash(hash: Hash, parents: Vec<Hash>) -> Self {
        Self {
            hash,
            version: crate::constants::BLOCK_VERSION,
            parents_by_level: vec![parents],
            hash_merkle_root: ZERO_HASH,
            accepted_id_merkle_root: ZERO_HASH,
            utxo_commitment: ZERO_HASH,
            timestamp: 0,
            bits: 0,
            nonce: 0,
            daa_score: 0,
            blue_work: 0u64.into(),
            blue_score: 0,
            pruning_point: ZERO_HASH,
        }
    }
}
