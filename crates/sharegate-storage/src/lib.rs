//! Persistence backends for share links.

pub mod memory;
pub mod mysql;
pub mod redis;

pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
pub use redis::RedisRepository;
pub use sharegate_core::{ReadRepository, Repository, StorageError};
