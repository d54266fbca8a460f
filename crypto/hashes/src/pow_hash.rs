use crate::{Hash, HashWriter};
use std::io::Write;

/// Hash writer following the PoW hashing rule:
/// `PRE_POW_HASH || TIME || 32 zero byte padding || NONCE`.
///
/// The state is seeded once per template and cloned per nonce, so the miner
/// loop only pays for the trailing nonce bytes.
#[derive(Clone)]
pub struct PowHash {
    inner: HashWriter,
}

impl PowHash {
    #[inline]
    pub fn new(pre_pow_hash: Hash, timestamp: u64) -> Self {
        let mut inner = HashWriter::tagged(b"ProofOfWorkHash");
        inner.write_all(pre_pow_hash.as_bytes()).unwrap();
        inner.write_all(&timestamp.to_le_bytes()).unwrap();
        inner.write_all(&[0u8; 32]).unwrap();
        Self { inner }
    }

    #[inline]
    pub fn finalize_with_nonce(mut self, nonce: u64) -> Hash {
        self.inner.write_all(&nonce.to_le_bytes()).unwrap();
        self.inner.finalize()
    }
}

/// One-shot hasher for the second (post-matrix) PoW pass.
pub struct HeavyHasher;

impl HeavyHasher {
    #[inline]
    pub fn hash(in_hash: Hash) -> Hash {
        let mut writer = HashWriter::tagged(b"HeavyHash");
        writer.write_all(in_hash.as_bytes()).unwrap();
        writer.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn pow_hash_is_deterministic_per_nonce() {
        let pre_hash = Hash::from_bytes(hex!("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"));
        let seeded = PowHash::new(pre_hash, 1234567890);

        let first = seeded.clone().finalize_with_nonce(42);
        let again = seeded.clone().finalize_with_nonce(42);
        assert_eq!(first, again);

        let other = seeded.finalize_with_nonce(43);
        assert_ne!(first, other);
    }

    #[test]
    fn heavy_hash_differs_from_input() {
        let input = Hash::from_le_u64([1, 2, 3, 4]);
        let hashed = HeavyHasher::hash(input);
        assert_ne!(hashed, input);
        assert_eq!(hashed, HeavyHasher::hash(input));
    }
}
