//! Named, versioned cache partitions.
//!
//! The coordinator never touches a backend directly; it goes through the
//! [`CacheStorage`] trait so the same routing code runs against:
//!
//! - [`MemoryStorage`], an in-process map used by tests and `in_memory` mode
//! - [`CacheDb`], a SQLite database accessed through tokio-rusqlite

pub mod connection;
pub mod entries;
pub mod key;
pub mod memory;
pub mod migrations;
pub mod partition;

pub use crate::Error;

pub use connection::CacheDb;
pub use key::{compute_cache_key, request_key};
pub use memory::MemoryStorage;
pub use partition::{Category, PartitionSet};

use crate::{Request, Response};

/// Summary of one partition, as returned by [`CacheStorage::describe`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
pub struct PartitionInfo {
    pub name: String,
    pub entries: u64,
}

/// Partitioned request → response storage.
///
/// Partitions are enumerated in creation order. Lookups and writes are keyed
/// by request identity (see [`request_key`]).
#[async_trait::async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the partition if it does not exist yet.
    async fn open(&self, partition: &str) -> Result<(), Error>;

    /// Whether a partition with this name exists.
    async fn has(&self, partition: &str) -> Result<bool, Error>;

    /// Names of every partition, oldest first.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Remove a partition and all of its entries. Returns false if it did not exist.
    async fn delete(&self, partition: &str) -> Result<bool, Error>;

    /// Look up a request in one partition.
    async fn lookup(&self, partition: &str, request: &Request) -> Result<Option<Response>, Error>;

    /// Look up a request across all partitions, oldest partition first.
    async fn lookup_any(&self, request: &Request) -> Result<Option<Response>, Error>;

    /// Insert or overwrite the entry for a request, creating the partition if needed.
    async fn put(&self, partition: &str, request: &Request, response: &Response) -> Result<(), Error>;

    /// Write several entries at once, creating the partition if needed.
    ///
    /// Either every entry is written or none is.
    async fn put_all(&self, partition: &str, entries: &[(Request, Response)]) -> Result<(), Error>;

    /// Entry counts for every partition, oldest first.
    async fn describe(&self) -> Result<Vec<PartitionInfo>, Error>;
}
