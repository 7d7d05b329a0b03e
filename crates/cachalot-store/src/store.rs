use async_trait::async_trait;

use crate::{
    entry::CacheEntry,
    error::{StoreError, StoreResult},
};

/// A named set of cache partitions.
#[async_trait]
pub trait CacheStore: Clone + Send + Sync + 'static {
    /// Handle type returned by `open_partition`. Must be Clone so routers can
    /// share it across concurrent requests.
    type Partition: Partition;

    /// Open (creating if absent) the partition named `name`.
    async fn open_partition(&self, name: &str) -> StoreResult<Self::Partition>;

    /// Delete the partition named `name` and all its entries.
    ///
    /// Deleting a partition that does not exist is not an error.
    async fn delete_partition(&self, name: &str) -> StoreResult<()>;
}

/// A single key → [`CacheEntry`] partition.
///
/// No atomicity is promised between `get` and `put`: two concurrent misses
/// for the same key may both fetch and both write. Writes must be
/// last-writer-wins and never expose a torn entry.
#[async_trait]
pub trait Partition: Clone + Send + Sync + 'static {
    /// Look up the entry stored under `key`.
    async fn get(&self, key: &str) -> StoreResult<Option<CacheEntry>>;

    /// Store `entry` under `key`, replacing any previous entry.
    async fn put(&self, key: &str, entry: CacheEntry) -> StoreResult<()>;

    /// Remove the entry stored under `key`, if any.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Enumerate the keys currently present in this partition.
    async fn keys(&self) -> StoreResult<Vec<String>>;
}

/// Validate a partition name for use as a single path segment.
pub(crate) fn validate_partition_name(name: &str) -> StoreResult<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(StoreError::InvalidPartitionName(name.to_string()));
    }
    Ok(())
}
