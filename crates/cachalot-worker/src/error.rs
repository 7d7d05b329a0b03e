use cachalot_net::NetError;
use cachalot_store::StoreError;
use thiserror::Error;

/// Centralized error type for the worker lifecycle.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("network error: {0}")]
    Net(#[from] NetError),

    #[error("cache store error: {0}")]
    Store(#[from] StoreError),

    #[error("manifest snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("shell path {path:?} is not in the manifest")]
    ShellNotInManifest { path: String },

    #[error("manifest has no entry for document {key:?}")]
    MissingDocumentEntry { key: String },

    #[error("shell fetch for {path:?} returned HTTP {status}")]
    ShellFetch { path: String, status: u16 },

    #[error("invalid resource URL for {key:?}: {source}")]
    ResourceUrl {
        key: String,
        source: url::ParseError,
    },

    #[error("activation failed, cache partitions were reset: {0}")]
    Activation(#[source] Box<WorkerError>),

    #[error("worker was discarded after a failed install")]
    Discarded,
}

pub type WorkerResult<T> = Result<T, WorkerError>;
