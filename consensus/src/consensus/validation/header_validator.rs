//! Header validation
//!
//! The individual rule checks of the header pipeline: syntax, parent
//! resolution, proof of work, difficulty, timestamps and the consensus
//! fields a miner must copy from its own GHOSTDAG view.

use crate::consensus::types::{ConsensusError, ConsensusResult};
use crate::unix_now_ms;
use consensus_core::constants::BLOCK_VERSION;
use consensus_core::errors::RuleError;
use consensus_core::header::Header;
use consensus_core::status::BlockStatus;
use consensus_core::{BlockHashSet, Hash};
use database::stores::GhostdagData;
use database::{ConsensusStorage, StagingArea};
use std::sync::Arc;

pub struct HeaderValidator {
    max_block_parents: usize,
    max_block_time_offset: u64,
    storage: Arc<ConsensusStorage>,
}

impl HeaderValidator {
    pub fn new(max_block_parents: usize, max_block_time_offset: u64, storage: Arc<ConsensusStorage>) -> Self {
        Self { max_block_parents, max_block_time_offset, storage }
    }

    /// Context-free checks: version, parent counts, duplicate parents
    pub fn check_header_in_isolation(&self, header: &Header) -> Result<(), RuleError> {
        if header.version != BLOCK_VERSION {
            return Err(RuleError::WrongBlockVersion { expected: BLOCK_VERSION, got: header.version });
        }

        let direct_parents = header.direct_parents();
        if direct_parents.is_empty() {
            // Only the configured genesis may lack parents, and genesis is
            // inserted at startup, never submitted
            return Err(RuleError::NoParents);
        }
        for level_parents in &header.parents_by_level {
            if level_parents.len() > self.max_block_parents {
                return Err(RuleError::TooManyParents { got: level_parents.len(), max: self.max_block_parents });
            }
        }

        let mut seen = BlockHashSet::default();
        for parent in direct_parents {
            if !seen.insert(*parent) {
                return Err(RuleError::DuplicateParents(*parent));
            }
        }
        Ok(())
    }

    /// Every direct parent must be known; unknown parents orphan the block
    /// (a scheduling signal), while a known-invalid parent damns it
    pub fn check_parents_known(&self, staging: &StagingArea, header: &Header) -> ConsensusResult<()> {
        let mut missing = Vec::new();
        for parent in header.direct_parents() {
            match staging.status(&self.storage, parent)? {
                None => missing.push(*parent),
                Some(BlockStatus::Invalid) => return Err(RuleError::InvalidParent(*parent).into()),
                Some(_) => {}
            }
        }
        if !missing.is_empty() {
            return Err(ConsensusError::MissingParents(missing));
        }
        Ok(())
    }

    /// Recomputes the heavy hash and compares it to the declared target
    pub fn check_pow(&self, header: &Header) -> Result<(), RuleError> {
        let state = consensus_pow::State::new(header);
        let (passed, _) = state.check_pow(header.nonce);
        if passed {
            Ok(())
        } else {
            Err(RuleError::InvalidProofOfWork)
        }
    }

    /// The declared bits must equal the deterministic DAA output exactly
    pub fn check_difficulty(&self, header: &Header, expected_bits: u32) -> Result<(), RuleError> {
        if header.bits != expected_bits {
            return Err(RuleError::UnexpectedDifficulty { expected: expected_bits, got: header.bits });
        }
        Ok(())
    }

    /// Strictly above the past median, and not too far past wall clock
    pub fn check_timestamp(&self, header: &Header, past_median_time: u64) -> Result<(), RuleError> {
        if header.timestamp <= past_median_time {
            return Err(RuleError::TimeTooOld { timestamp: header.timestamp, past_median_time });
        }
        let max_allowed = unix_now_ms() + self.max_block_time_offset;
        if header.timestamp > max_allowed {
            return Err(RuleError::TimeTooFarIntoFuture { timestamp: header.timestamp, max_allowed });
        }
        Ok(())
    }

    /// The GHOSTDAG-derived fields are not free parameters of the miner:
    /// the declared values must match what consensus computed
    pub fn check_declared_ghostdag_fields(
        &self,
        header: &Header,
        ghostdag_data: &GhostdagData,
        daa_score: u64,
    ) -> Result<(), RuleError> {
        if header.blue_score != ghostdag_data.blue_score {
            return Err(RuleError::BadBlueScore { declared: header.blue_score, computed: ghostdag_data.blue_score });
        }
        if header.blue_work != ghostdag_data.blue_work {
            return Err(RuleError::BadBlueWork { declared: header.blue_work, computed: ghostdag_data.blue_work });
        }
        if header.daa_score != daa_score {
            return Err(RuleError::BadDaaScore { declared: header.daa_score, computed: daa_score });
        }
        Ok(())
    }

    /// Used by query paths that take a hash the caller claims exists
    pub fn check_block_known(&self, staging: &StagingArea, hash: &Hash) -> ConsensusResult<bool> {
        Ok(staging.status(&self.storage, hash)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::ZERO_HASH;
    use database::Database;
    use tempfile::TempDir;

    fn validator() -> (TempDir, HeaderValidator) {
        let tmp = TempDir::new().unwrap();
        let storage = Arc::new(ConsensusStorage::new(Arc::new(Database::open(tmp.path()).unwrap())));
        (tmp, HeaderValidator::new(10, 2 * 3600 * 1000, storage))
    }

    fn header_with_parents(parents: Vec<Hash>) -> Header {
        Header::from_precomputed_hash(Hash::from_le_u64([99, 0, 0, 0]), parents)
    }

    #[test]
    fn parentless_headers_are_rejected() {
        let (_tmp, validator) = validator();
        assert_eq!(validator.check_header_in_isolation(&header_with_parents(vec![])), Err(RuleError::NoParents));
    }

    #[test]
    fn duplicate_parents_are_rejected() {
        let (_tmp, validator) = validator();
        let parent = Hash::from_le_u64([1, 0, 0, 0]);
        assert_eq!(
            validator.check_header_in_isolation(&header_with_parents(vec![parent, parent])),
            Err(RuleError::DuplicateParents(parent))
        );
    }

    #[test]
    fn too_many_parents_are_rejected() {
        let (_tmp, validator) = validator();
        let parents: Vec<Hash> = (0..11).map(|i| Hash::from_le_u64([i, 1, 0, 0])).collect();
        assert!(matches!(
            validator.check_header_in_isolation(&header_with_parents(parents)),
            Err(RuleError::TooManyParents { got: 11, max: 10 })
        ));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let (_tmp, validator) = validator();
        let mut header = header_with_parents(vec![ZERO_HASH]);
        header.version = 0;
        assert!(matches!(validator.check_header_in_isolation(&header), Err(RuleError::WrongBlockVersion { .. })));
    }

    #[test]
    fn timestamps_must_beat_the_median_but_not_the_clock() {
        let (_tmp, validator) = validator();
        let mut header = header_with_parents(vec![ZERO_HASH]);

        header.timestamp = 1000;
        assert!(matches!(validator.check_timestamp(&header, 1000), Err(RuleError::TimeTooOld { .. })));

        header.timestamp = 1001;
        assert_eq!(validator.check_timestamp(&header, 1000), Ok(()));

        header.timestamp = unix_now_ms() + 3 * 3600 * 1000;
        assert!(matches!(validator.check_timestamp(&header, 1000), Err(RuleError::TimeTooFarIntoFuture { .. })));
    }

    #[test]
    fn unknown_parents_surface_as_missing() {
        let (_tmp, validator) = validator();
        let staging = StagingArea::new();
        let parent = Hash::from_le_u64([5, 0, 0, 0]);
        let header = header_with_parents(vec![parent]);
        match validator.check_parents_known(&staging, &header) {
            Err(ConsensusError::MissingParents(missing)) => assert_eq!(missing, vec![parent]),
            other => panic!("expected missing parents, got {other:?}"),
        }
    }

    #[test]
    fn invalid_parents_damn_the_block() {
        let (_tmp, validator) = validator();
        let mut staging = StagingArea::new();
        let parent = Hash::from_le_u64([5, 0, 0, 0]);
        staging.stage_status(parent, BlockStatus::Invalid);
        let header = header_with_parents(vec![parent]);
        assert!(matches!(
            validator.check_parents_known(&staging, &header),
            Err(ConsensusError::RuleViolation(RuleError::InvalidParent(_)))
        ));
    }
}
