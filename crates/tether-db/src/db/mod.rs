//! Database repositories for data access layer
//!
//! Each repository is responsible for a specific domain entity and provides
//! CRUD operations and the workspace-scoping checks the entity requires.

pub mod connection;
pub mod shard;

pub use connection::ConnectionRepository;
pub use shard::ShardRepository;
