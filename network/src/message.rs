use consensus_core::block::Block;
use consensus_core::header::Header;
use consensus_core::Hash;
use serde::{Deserialize, Serialize};

/// Frames larger than this are protocol violations
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// The protocol version this node speaks
pub const PROTOCOL_VERSION: u32 = 1;

/// One peer-to-peer message. The variant set is the protocol command set;
/// `command` gives the canonical command string used in logs and bans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
    Version { protocol_version: u32, network: String, user_agent: String, timestamp: u64 },
    Verack,
    RequestAddresses,
    Addresses { addresses: Vec<String> },
    RequestIbdChainBlockLocator { low_hash: Option<Hash>, high_hash: Option<Hash> },
    IbdChainBlockLocator { locator_hashes: Vec<Hash> },
    RequestHeaders { low_hash: Hash, high_hash: Hash },
    BlockHeaders { headers: Vec<Header> },
    Block(Box<Block>),
    Ping { nonce: u64 },
    Pong { nonce: u64 },
}

impl Message {
    pub fn command(&self) -> &'static str {
        match self {
            Message::Version { .. } => "Version",
            Message::Verack => "Verack",
            Message::RequestAddresses => "RequestAddresses",
            Message::Addresses { .. } => "Addresses",
            Message::RequestIbdChainBlockLocator { .. } => "RequestIBDChainBlockLocator",
            Message::IbdChainBlockLocator { .. } => "IBDChainBlockLocator",
            Message::RequestHeaders { .. } => "RequestHeaders",
            Message::BlockHeaders { .. } => "BlockHeaders",
            Message::Block(_) => "Block",
            Message::Ping { .. } => "Ping",
            Message::Pong { .. } => "Pong",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_roundtrip() {
        let messages = vec![
            Message::Version {
                protocol_version: PROTOCOL_VERSION,
                network: "vexa".into(),
                user_agent: "/vexad:0.1.0/".into(),
                timestamp: 1715866200000,
            },
            Message::Verack,
            Message::RequestIbdChainBlockLocator { low_hash: None, high_hash: Some(Hash::from_le_u64([9, 0, 0, 0])) },
            Message::Pong { nonce: 7 },
        ];
        for msg in messages {
            let bytes = bincode::serialize(&msg).unwrap();
            let decoded: Message = bincode::deserialize(&bytes).unwrap();
            assert_eq!(decoded.command(), msg.command());
        }
    }
}
