use crate::{Hash, ZERO_HASH};
use crypto_hashes::HashWriter;
use std::io::Write;

/// A binary merkle tree over transaction ids.
///
/// Odd nodes pair with the zero hash; the root of an empty tree is the zero
/// hash. Interior nodes hash under their own domain tag so a leaf can never
/// be reinterpreted as a branch.
pub struct MerkleTree {
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    pub fn from_hashes(hashes: Vec<Hash>) -> Self {
        let mut levels = vec![hashes];
        loop {
            let current = levels.last().unwrap();
            if current.len() <= 1 {
                break;
            }
            let next = current
                .chunks(2)
                .map(|pair| hash_branch(pair[0], *pair.get(1).unwrap_or(&ZERO_HASH)))
                .collect();
            levels.push(next);
        }
        Self { levels }
    }

    pub fn root(&self) -> Hash {
        match self.levels.last() {
            Some(level) if !level.is_empty() => level[0],
            _ => ZERO_HASH,
        }
    }
}

/// Computes the merkle root over the given hashes
pub fn calc_merkle_root(hashes: impl IntoIterator<Item = Hash>) -> Hash {
    MerkleTree::from_hashes(hashes.into_iter().collect()).root()
}

fn hash_branch(left: Hash, right: Hash) -> Hash {
    let mut writer = HashWriter::tagged(b"MerkleBranchHash");
    writer.write_all(left.as_bytes()).unwrap();
    writer.write_all(right.as_bytes()).unwrap();
    writer.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(n: u64) -> Hash {
        Hash::from_le_u64([n, 0, 0, 0])
    }

    #[test]
    fn empty_tree_has_zero_root() {
        assert_eq!(calc_merkle_root(vec![]), ZERO_HASH);
    }

    #[test]
    fn single_leaf_is_its_own_root() {
        assert_eq!(calc_merkle_root(vec![leaf(1)]), leaf(1));
    }

    #[test]
    fn root_commits_to_order_and_content() {
        let forward = calc_merkle_root(vec![leaf(1), leaf(2), leaf(3)]);
        let reversed = calc_merkle_root(vec![leaf(3), leaf(2), leaf(1)]);
        let mutated = calc_merkle_root(vec![leaf(1), leaf(2), leaf(4)]);
        assert_ne!(forward, reversed);
        assert_ne!(forward, mutated);
        assert_eq!(forward, calc_merkle_root(vec![leaf(1), leaf(2), leaf(3)]));
    }

    #[test]
    fn odd_leaf_pairs_with_zero() {
        let two = calc_merkle_root(vec![leaf(1), leaf(2)]);
        let three = calc_merkle_root(vec![leaf(1), leaf(2), leaf(3)]);
        assert_ne!(two, three);
    }
}
