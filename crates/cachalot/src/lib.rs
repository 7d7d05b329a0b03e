#![forbid(unsafe_code)]

//! # Cachalot
//!
//! Facade crate for the offline-availability cache worker: install a
//! versioned application shell, reconcile cached resources against each new
//! manifest, and serve intercepted requests cache-first.
//!
//! ## Quick start
//!
//! ```ignore
//! use cachalot::prelude::*;
//!
//! let manifest = Manifest::from_iter([("index.html", "abc123"), ("main.js", "def456")])
//!     .with_root_alias("index.html")?;
//! let worker = WorkerConfig::new(origin, manifest)
//!     .with_shell(["index.html", "main.js"])
//!     .build()?;
//! worker.start().await?;
//!
//! let router = worker.router().await?;
//! match router.handle_get(&request_url).await? {
//!     FetchOutcome::Response(resp) => serve(resp),
//!     FetchOutcome::Passthrough => forward_to_network(request_url),
//! }
//! ```

// ── Re-export sub-crates ────────────────────────────────────────────────

pub mod net {
    pub use cachalot_net::*;
}

pub mod store {
    pub use cachalot_store::*;
}

pub mod worker {
    pub use cachalot_worker::*;
}

// ── Configuration ───────────────────────────────────────────────────────

mod config;

pub use config::WorkerConfig;

pub use cachalot_net::{Freshness, HttpResponse, NetOptions};
pub use cachalot_store::{CacheBackend, CacheEntry};
pub use cachalot_worker::{
    FetchOutcome, FetchRouter, LifecycleState, Manifest, PartitionNames, PrefetchReport,
    ServiceWorker, ShellSet, WorkerError, WorkerHandle, WorkerMessage, WorkerResult,
};

// ── Prelude ─────────────────────────────────────────────────────────────

pub mod prelude {
    pub use cachalot_net::{Freshness, HttpResponse, NetOptions};
    pub use cachalot_store::{CacheBackend, CacheEntry, CacheStore, Partition};
    pub use cachalot_worker::{
        FetchOutcome, LifecycleState, Manifest, PrefetchReport, ServiceWorker, ShellSet,
        WorkerError, WorkerMessage,
    };

    pub use crate::WorkerConfig;
}
