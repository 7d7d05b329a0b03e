#![forbid(unsafe_code)]

//! Configuration for building a [`ServiceWorker`] with the default stack.

use std::{path::PathBuf, sync::Arc};

use cachalot_net::{HttpClient, NetOptions};
use cachalot_store::{CacheBackend, DiskStore, MemStore};
use cachalot_worker::{Manifest, PartitionNames, ServiceWorker, ShellSet, WorkerResult};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Unified configuration for creating a [`ServiceWorker`].
///
/// Wraps the origin, manifest, shell, and backend choice into a single
/// builder; `build()` wires up the HTTP client and cache store.
///
/// # Example
///
/// ```ignore
/// use cachalot::{Manifest, WorkerConfig};
///
/// let manifest = Manifest::from_iter([("index.html", "abc123"), ("main.js", "def456")])
///     .with_root_alias("index.html")?;
/// let worker = WorkerConfig::new(origin, manifest)
///     .with_shell(["index.html", "main.js"])
///     .with_cache_dir("/var/cache/myapp")
///     .build()?;
/// worker.start().await?;
/// ```
pub struct WorkerConfig {
    /// Origin all manifest resources are resolved against.
    pub origin: Url,
    /// Build-time resource manifest.
    pub manifest: Manifest,
    /// Paths staged fresh at install.
    pub shell: ShellSet,
    /// Names of the live/staging/metadata partitions.
    pub partitions: PartitionNames,
    /// Root directory for the disk backend. Defaults to a `cachalot`
    /// directory under the system temp dir.
    pub cache_dir: Option<PathBuf>,
    /// Use the in-memory backend instead of disk (nothing persists).
    pub ephemeral: bool,
    /// Network configuration (timeouts, connection pooling).
    pub net: NetOptions,
    /// Cancellation token for graceful shutdown.
    pub cancel: Option<CancellationToken>,
}

impl WorkerConfig {
    pub fn new(origin: Url, manifest: Manifest) -> Self {
        Self {
            origin,
            manifest,
            shell: ShellSet::default(),
            partitions: PartitionNames::default(),
            cache_dir: None,
            ephemeral: false,
            net: NetOptions::default(),
            cancel: None,
        }
    }

    /// Set the shell paths staged fresh at install.
    pub fn with_shell<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shell = ShellSet::new(paths);
        self
    }

    /// Set the partition names (when several apps share one store root).
    pub fn with_partitions(mut self, partitions: PartitionNames) -> Self {
        self.partitions = partitions;
        self
    }

    /// Set the disk backend root directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Use the in-memory backend; nothing survives the process.
    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    /// Set network options.
    pub fn with_net(mut self, net: NetOptions) -> Self {
        self.net = net;
        self
    }

    /// Set cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Build the worker over the configured backend and a fresh HTTP client.
    pub fn build(self) -> WorkerResult<ServiceWorker<CacheBackend>> {
        let backend: CacheBackend = if self.ephemeral {
            MemStore::new().into()
        } else {
            let root = self
                .cache_dir
                .unwrap_or_else(|| std::env::temp_dir().join("cachalot"));
            DiskStore::new(root).into()
        };

        ServiceWorker::new(
            backend,
            Arc::new(HttpClient::new(self.net)),
            self.origin,
            self.manifest,
            self.shell,
            self.partitions,
            self.cancel.unwrap_or_default(),
        )
    }
}
