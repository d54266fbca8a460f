// public for benchmarks
#[doc(hidden)]
pub mod matrix;
#[doc(hidden)]
pub mod xoshiro;

use crate::matrix::Matrix;
use consensus_core::{difficulty::compact_to_big, hashing, header::Header, BlockLevel};
use crypto_hashes::PowHash;
use primitive_types::U256;

/// Intermediate mining state with everything derivable from the template
/// precomputed: the target, the seeded hasher and the heavy-hash matrix.
/// The miner loop mutates only the nonce.
pub struct State {
    pub(crate) matrix: Matrix,
    pub target: U256,
    // PRE_POW_HASH || TIME || 32 zero byte padding; without NONCE
    pub(crate) hasher: PowHash,
}

impl State {
    #[inline]
    pub fn new(header: &Header) -> Self {
        let target = compact_to_big(header.bits);
        // Zero out the time and nonce to produce the pre-pow hash
        let pre_pow_hash = hashing::header::hash_override_nonce_time(header, 0, 0);
        let hasher = PowHash::new(pre_pow_hash, header.timestamp);
        let matrix = Matrix::generate(pre_pow_hash);

        Self { matrix, target, hasher }
    }

    /// The PoW value: the heavy hash of
    /// `PRE_POW_HASH || TIME || 32 zero byte padding || NONCE`,
    /// read as a little-endian integer
    #[inline]
    #[must_use]
    pub fn calculate_pow(&self, nonce: u64) -> U256 {
        let hash = self.hasher.clone().finalize_with_nonce(nonce);
        let heavy = self.matrix.heavy_hash(hash);
        U256::from_little_endian(heavy.as_bytes())
    }

    /// The block satisfies PoW iff the value is at most the claimed target
    #[inline]
    #[must_use]
    pub fn check_pow(&self, nonce: u64) -> (bool, U256) {
        let pow = self.calculate_pow(nonce);
        (pow <= self.target, pow)
    }
}

/// The block level of a header: the number of leading zero bits its PoW
/// value has beyond the maximum level baseline.
pub fn calc_block_level(header: &Header, max_block_level: BlockLevel) -> BlockLevel {
    let (level, _) = calc_block_level_check_pow(header, max_block_level);
    level
}

/// Computes the block level and the PoW check in one pass, sharing the
/// expensive state construction
pub fn calc_block_level_check_pow(header: &Header, max_block_level: BlockLevel) -> (BlockLevel, bool) {
    if header.is_genesis() {
        // Genesis is the root of all levels by definition
        return (max_block_level, true);
    }

    let state = State::new(header);
    let (passed, pow) = state.check_pow(header.nonce);
    (calc_level_from_pow(pow, max_block_level), passed)
}

pub fn calc_level_from_pow(pow: U256, max_block_level: BlockLevel) -> BlockLevel {
    let signed_level = max_block_level as i64 - pow.bits() as i64;
    signed_level.clamp(0, max_block_level as i64) as BlockLevel
}
