//! RPC API trait definitions

use crate::model::*;
use async_trait::async_trait;
use consensus_core::block::Block;
use consensus_core::Hash;

/// The RPC methods a node exposes. The consensus core stays synchronous;
/// the adapter that implements this trait bridges into it.
#[async_trait]
pub trait RpcApi: Send + Sync {
    async fn get_block_count(&self) -> Result<u64, RpcError>;
    async fn get_block_dag_info(&self) -> Result<BlockDagInfo, RpcError>;
    async fn get_block_info(&self, hash: Hash) -> Result<RpcBlockInfo, RpcError>;
    async fn get_sync_info(&self) -> Result<RpcSyncInfo, RpcError>;
    async fn get_virtual_selected_parent_blue_score(&self) -> Result<u64, RpcError>;

    async fn submit_block(&self, block: Block) -> Result<Hash, RpcError>;
    async fn get_block_template(&self, mining_address: String, extra_data: Vec<u8>) -> Result<RpcBlockTemplate, RpcError>;
}

/// Subscription side of the API
#[async_trait]
pub trait NotificationApi: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), RpcError>;
}
