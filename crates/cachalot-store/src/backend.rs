//! Backend enum unifying the disk and in-memory stores behind one type.

use async_trait::async_trait;

use crate::{
    disk::{DiskPartition, DiskStore},
    entry::CacheEntry,
    error::StoreResult,
    mem::{MemPartition, MemStore},
    store::{CacheStore, Partition},
};

/// Either a [`DiskStore`] or a [`MemStore`].
///
/// Lets code that is generic over [`CacheStore`] be instantiated with one
/// concrete type while the backend stays a runtime choice.
#[derive(Clone, Debug)]
pub enum CacheBackend {
    Disk(DiskStore),
    Mem(MemStore),
}

impl From<DiskStore> for CacheBackend {
    fn from(store: DiskStore) -> Self {
        Self::Disk(store)
    }
}

impl From<MemStore> for CacheBackend {
    fn from(store: MemStore) -> Self {
        Self::Mem(store)
    }
}

#[async_trait]
impl CacheStore for CacheBackend {
    type Partition = BackendPartition;

    async fn open_partition(&self, name: &str) -> StoreResult<Self::Partition> {
        match self {
            Self::Disk(store) => Ok(BackendPartition::Disk(store.open_partition(name).await?)),
            Self::Mem(store) => Ok(BackendPartition::Mem(store.open_partition(name).await?)),
        }
    }

    async fn delete_partition(&self, name: &str) -> StoreResult<()> {
        match self {
            Self::Disk(store) => store.delete_partition(name).await,
            Self::Mem(store) => store.delete_partition(name).await,
        }
    }
}

/// Partition handle for [`CacheBackend`].
#[derive(Clone, Debug)]
pub enum BackendPartition {
    Disk(DiskPartition),
    Mem(MemPartition),
}

#[async_trait]
impl Partition for BackendPartition {
    async fn get(&self, key: &str) -> StoreResult<Option<CacheEntry>> {
        match self {
            Self::Disk(p) => p.get(key).await,
            Self::Mem(p) => p.get(key).await,
        }
    }

    async fn put(&self, key: &str, entry: CacheEntry) -> StoreResult<()> {
        match self {
            Self::Disk(p) => p.put(key, entry).await,
            Self::Mem(p) => p.put(key, entry).await,
        }
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        match self {
            Self::Disk(p) => p.delete(key).await,
            Self::Mem(p) => p.delete(key).await,
        }
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        match self {
            Self::Disk(p) => p.keys().await,
            Self::Mem(p) => p.keys().await,
        }
    }
}
