//! RPC data models and types

use consensus_core::{BlueWorkType, Hash};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// RPC error type
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum RpcError {
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Aggregate DAG information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDagInfo {
    pub network_name: String,
    pub block_count: u64,
    pub header_count: u64,
    pub tip_hashes: Vec<Hash>,
    pub virtual_selected_parent: Option<Hash>,
    pub virtual_daa_score: u64,
    pub difficulty_bits: u32,
    pub pruning_point_hash: Option<Hash>,
}

/// Per-block consensus information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlockInfo {
    pub hash: Hash,
    pub blue_score: u64,
    pub blue_work: BlueWorkType,
    pub selected_parent: Option<Hash>,
    pub mergeset_blues: Vec<Hash>,
    pub mergeset_reds: Vec<Hash>,
    pub is_chain_block: bool,
}

/// Sync progress summary
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcSyncInfo {
    pub header_count: u64,
    pub block_count: u64,
    pub is_synced: bool,
}

/// A mining template as the RPC layer ships it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlockTemplate {
    pub block: consensus_core::block::Block,
    pub is_synced: bool,
}

/// Events pushed to notification subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Notification {
    VirtualSelectedParentBlueScoreChanged { blue_score: u64 },
    VirtualDaaScoreChanged { daa_score: u64 },
    NewBlockTemplate,
}
