#![forbid(unsafe_code)]

//! Partitioned cache store for cachalot.
//!
//! A [`CacheStore`] is a set of independently named partitions; each
//! [`Partition`] is a key → [`CacheEntry`] blob store. The worker uses three
//! partitions: staging (filled at install), metadata (one manifest snapshot
//! entry), and live (what requests are served from).
//!
//! ## Handle semantics (normative)
//!
//! Partition handles resolve their partition on every operation. Deleting a
//! partition and reopening it under the same name leaves previously issued
//! handles functional — they simply see the recreated (empty) partition. The
//! activator relies on this during its wipe-and-rebuild paths.

mod backend;
mod disk;
mod entry;
mod error;
mod mem;
mod store;

pub use crate::{
    backend::{BackendPartition, CacheBackend},
    disk::{DiskPartition, DiskStore},
    entry::CacheEntry,
    error::{StoreError, StoreResult},
    mem::{MemPartition, MemStore},
    store::{CacheStore, Partition},
};
