//! RPC surface of the node: data models, the API trait implemented by the
//! server-side adapter, and the notification model pushed to subscribers.

pub mod api;
pub mod model;

pub use api::RpcApi;
pub use model::*;
