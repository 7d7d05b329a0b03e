#![forbid(unsafe_code)]

//! # cachalot-worker
//!
//! The offline-availability lifecycle: install (stage the application
//! shell), activate (reconcile the live cache against the new manifest),
//! route intercepted requests, and prefetch the full manifest on command.
//!
//! ## Lifecycle ordering (normative)
//!
//! Reconciliation must complete before any request is served from the live
//! partition. [`FetchRouter::handle`] enforces this explicitly by awaiting
//! the [`LifecycleGate`] — there is no reliance on callers sequencing events
//! correctly.
//!
//! ## Failure policy (normative)
//!
//! - A failed shell fetch fails the install; the worker goes
//!   [`LifecycleState::Redundant`] and routers return
//!   [`WorkerError::Discarded`].
//! - Any error during reconciliation wipes all three partitions (a
//!   half-reconciled cache is worse than an empty one); the next activation
//!   takes the first-install path.

mod activate;
mod error;
mod fetch;
mod install;
mod lifecycle;
mod manifest;
mod prefetch;
mod routes;
mod worker;

pub use crate::{
    activate::activate,
    error::{WorkerError, WorkerResult},
    fetch::{FetchOutcome, FetchRouter},
    install::install,
    lifecycle::{LifecycleGate, LifecycleState},
    manifest::{Manifest, PartitionNames, ROOT_ALIAS, SNAPSHOT_KEY, ShellSet},
    prefetch::{PrefetchFailure, PrefetchReport, prefetch_missing},
    routes::{Route, logical_key, resource_url, route_request},
    worker::{ServiceWorker, WorkerHandle, WorkerMessage},
};
