//! In-memory cache store for ephemeral use and tests.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::{
    entry::CacheEntry,
    error::StoreResult,
    store::{CacheStore, Partition, validate_partition_name},
};

type PartitionMap = Arc<DashMap<String, CacheEntry>>;

/// In-memory [`CacheStore`]. Nothing is persisted.
#[derive(Clone, Debug, Default)]
pub struct MemStore {
    partitions: Arc<DashMap<String, PartitionMap>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemStore {
    type Partition = MemPartition;

    async fn open_partition(&self, name: &str) -> StoreResult<Self::Partition> {
        validate_partition_name(name)?;
        self.partitions.entry(name.to_string()).or_default();
        Ok(MemPartition {
            name: name.to_string(),
            partitions: Arc::clone(&self.partitions),
        })
    }

    async fn delete_partition(&self, name: &str) -> StoreResult<()> {
        validate_partition_name(name)?;
        self.partitions.remove(name);
        Ok(())
    }
}

/// Handle to one in-memory partition.
///
/// Resolves the partition by name on each operation, so the handle remains
/// valid across delete/recreate cycles.
#[derive(Clone, Debug)]
pub struct MemPartition {
    name: String,
    partitions: Arc<DashMap<String, PartitionMap>>,
}

impl MemPartition {
    fn map(&self) -> PartitionMap {
        self.partitions
            .entry(self.name.clone())
            .or_default()
            .clone()
    }
}

#[async_trait]
impl Partition for MemPartition {
    async fn get(&self, key: &str) -> StoreResult<Option<CacheEntry>> {
        Ok(self.map().get(key).map(|e| e.clone()))
    }

    async fn put(&self, key: &str, entry: CacheEntry) -> StoreResult<()> {
        self.map().insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.map().remove(key);
        Ok(())
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.map().iter().map(|e| e.key().clone()).collect())
    }
}
