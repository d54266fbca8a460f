use crate::header::Header;
use crate::merkle::calc_merkle_root;
use crate::tx::Transaction;
use crate::Hash;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// A complete block: header plus transactions
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(header: Header, transactions: Vec<Transaction>) -> Self {
        Self { header, transactions }
    }

    pub fn from_header(header: Header) -> Self {
        Self { header, transactions: Vec::new() }
    }

    pub fn hash(&self) -> Hash {
        self.header.hash
    }

    pub fn is_header_only(&self) -> bool {
        self.transactions.is_empty()
    }

    /// The merkle root the header should commit to for these transactions
    pub fn expected_merkle_root(&self) -> Hash {
        calc_merkle_root(self.transactions.iter().map(|tx| tx.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subnets::SUBNETWORK_ID_COINBASE;
    use crate::ZERO_HASH;

    #[test]
    fn header_only_detection() {
        let header = Header::from_precomputed_hash(Hash::from_le_u64([1, 0, 0, 0]), vec![]);
        assert!(Block::from_header(header.clone()).is_header_only());

        let coinbase = Transaction::new(0, vec![], vec![], 0, SUBNETWORK_ID_COINBASE, 0, vec![]);
        let block = Block::new(header, vec![coinbase]);
        assert!(!block.is_header_only());
        assert_ne!(block.expected_merkle_root(), ZERO_HASH);
    }
}
