use crate::block::Block;
use crate::constants::{BLOCK_VERSION, INITIAL_SUBSIDY};
use crate::header::Header;
use crate::merkle::calc_merkle_root;
use crate::subnets::SUBNETWORK_ID_COINBASE;
use crate::tx::{ScriptPublicKey, Transaction, TransactionOutput};
use crate::{BlueWorkType, Hash, ZERO_HASH};

/// The constants uniquely defining a network's genesis block.
///
/// The hash itself is derived, never pinned: it falls out of the canonical
/// header serialization, so a codec change surfaces as a different genesis
/// rather than a silent fork.
#[derive(Clone, Debug)]
pub struct GenesisBlock {
    pub version: u16,
    pub timestamp: u64,
    pub bits: u32,
    pub nonce: u64,
    pub coinbase_payload: &'static [u8],
}

impl GenesisBlock {
    pub fn build_transactions(&self) -> Vec<Transaction> {
        vec![Transaction::new(
            0,
            Vec::new(),
            vec![TransactionOutput::new(INITIAL_SUBSIDY, ScriptPublicKey::from_vec(0, Vec::new()))],
            0,
            SUBNETWORK_ID_COINBASE,
            0,
            self.coinbase_payload.to_vec(),
        )]
    }

    pub fn build_header(&self) -> Header {
        let transactions = self.build_transactions();
        Header::new_finalized(
            self.version,
            Vec::new(),
            calc_merkle_root(transactions.iter().map(|tx| tx.id())),
            ZERO_HASH,
            ZERO_HASH,
            self.timestamp,
            self.bits,
            self.nonce,
            0,
            BlueWorkType::ZERO,
            0,
            ZERO_HASH,
        )
    }

    pub fn build_block(&self) -> Block {
        Block::new(self.build_header(), self.build_transactions())
    }

    pub fn hash(&self) -> Hash {
        self.build_header().hash
    }
}

pub const GENESIS: GenesisBlock = GenesisBlock {
    version: BLOCK_VERSION,
    timestamp: 1715866200000,
    bits: 0x1e7fffff,
    nonce: 271828,
    coinbase_payload: b"vexa mainnet genesis",
};

pub const TESTNET_GENESIS: GenesisBlock = GenesisBlock {
    version: BLOCK_VERSION,
    timestamp: 1715866200000,
    bits: 0x1f7fffff,
    nonce: 31415,
    coinbase_payload: b"vexa testnet genesis",
};

pub const DEVNET_GENESIS: GenesisBlock = GenesisBlock {
    version: BLOCK_VERSION,
    timestamp: 1715866200000,
    bits: 0x207fffff,
    nonce: 0,
    coinbase_payload: b"vexa devnet genesis",
};

pub const SIMNET_GENESIS: GenesisBlock = GenesisBlock {
    version: BLOCK_VERSION,
    timestamp: 1715866200000,
    bits: 0x207fffff,
    nonce: 0,
    coinbase_payload: b"vexa simnet genesis",
};
