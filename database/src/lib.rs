pub mod cache;
pub mod db;
pub mod errors;
pub mod staging;
pub mod stores;

pub use db::Database;
pub use errors::{DbError, DbResult};
pub use staging::StagingArea;
pub use stores::ConsensusStorage;
