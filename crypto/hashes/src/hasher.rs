use crate::Hash;
use sha2::{Digest, Sha256};
use std::io::Write;

/// Compute SHA256(data)
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// A SHA-256 state behind the `Write` trait, seeded with a domain
/// separation tag so digests from different contexts never collide.
#[derive(Clone)]
pub struct HashWriter(Sha256);

impl HashWriter {
    /// Fixed length all tags are padded to, so the tag block boundary is
    /// identical across domains.
    const TAG_LEN: usize = 32;

    pub fn new() -> Self {
        Self(Sha256::new())
    }

    /// Creates a writer whose state starts with the given domain tag.
    pub fn tagged(tag: &[u8]) -> Self {
        debug_assert!(tag.len() <= Self::TAG_LEN);
        let mut padded = [0u8; Self::TAG_LEN];
        padded[..tag.len()].copy_from_slice(tag);
        let mut state = Sha256::new();
        state.update(padded);
        Self(state)
    }

    pub fn finalize(self) -> Hash {
        Hash::from_bytes(self.0.finalize().into())
    }
}

impl Write for HashWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Default for HashWriter {
    fn default() -> Self {
        Self::new()
    }
}
