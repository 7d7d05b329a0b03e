//! Disk-backed cache store.
//!
//! Layout: `<root>/<partition>/<hex(sha256(key))>.bin` for the body plus a
//! `.meta.json` sidecar holding the logical key, status, and content type.
//! The meta file is committed last via write-temp-then-rename, so a readable
//! meta file always refers to a complete body: crashes leave either the old
//! entry or the new one, never a torn one.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::{
    entry::CacheEntry,
    error::StoreResult,
    store::{CacheStore, Partition, validate_partition_name},
};

const META_SUFFIX: &str = ".meta.json";

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    key: String,
    status: u16,
    content_type: Option<String>,
}

/// Disk-backed [`CacheStore`] rooted at a directory.
#[derive(Clone, Debug)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl CacheStore for DiskStore {
    type Partition = DiskPartition;

    async fn open_partition(&self, name: &str) -> StoreResult<Self::Partition> {
        validate_partition_name(name)?;
        let dir = self.root.join(name);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(DiskPartition { dir })
    }

    async fn delete_partition(&self, name: &str) -> StoreResult<()> {
        validate_partition_name(name)?;
        let dir = self.root.join(name);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Handle to one on-disk partition.
#[derive(Clone, Debug)]
pub struct DiskPartition {
    dir: PathBuf,
}

impl DiskPartition {
    /// File stem for a logical key. Keys are URL paths (slashes, the bare
    /// `/` root alias), so they are hashed rather than used as filenames.
    fn stem(key: &str) -> String {
        let digest = Sha256::digest(key.as_bytes());
        hex::encode(&digest[..16])
    }

    fn body_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.bin", Self::stem(key)))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}{META_SUFFIX}", Self::stem(key)))
    }

    /// Write `data` to `target` via a uniquely named temp file + rename.
    async fn write_atomic(&self, target: &Path, data: &[u8]) -> StoreResult<()> {
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = target.with_extension(format!("tmp{seq}"));
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, target).await?;
        Ok(())
    }

    async fn remove_if_present(path: &Path) -> StoreResult<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Partition for DiskPartition {
    async fn get(&self, key: &str) -> StoreResult<Option<CacheEntry>> {
        let meta_bytes = match tokio::fs::read(self.meta_path(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let meta: EntryMeta = serde_json::from_slice(&meta_bytes)?;

        let body = match tokio::fs::read(self.body_path(key)).await {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(CacheEntry {
            status: meta.status,
            content_type: meta.content_type,
            body,
        }))
    }

    async fn put(&self, key: &str, entry: CacheEntry) -> StoreResult<()> {
        // The partition may have been wiped since this handle was issued.
        tokio::fs::create_dir_all(&self.dir).await?;

        self.write_atomic(&self.body_path(key), &entry.body).await?;
        let meta = EntryMeta {
            key: key.to_string(),
            status: entry.status,
            content_type: entry.content_type,
        };
        let meta_bytes = serde_json::to_vec(&meta)?;
        // Meta last: its presence marks the entry committed.
        self.write_atomic(&self.meta_path(key), &meta_bytes).await?;
        trace!(key, dir = %self.dir.display(), "stored entry");
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        // Meta first, so a crash mid-delete leaves no visible entry.
        Self::remove_if_present(&self.meta_path(key)).await?;
        Self::remove_if_present(&self.body_path(key)).await?;
        Ok(())
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(dirent) = dir.next_entry().await? {
            let name = dirent.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.ends_with(META_SUFFIX) {
                continue;
            }
            let bytes = match tokio::fs::read(dirent.path()).await {
                Ok(bytes) => bytes,
                // Concurrent delete between readdir and read.
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            let meta: EntryMeta = serde_json::from_slice(&bytes)?;
            keys.push(meta.key);
        }
        Ok(keys)
    }
}
