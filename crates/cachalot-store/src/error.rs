use thiserror::Error;

/// Cache store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid partition name: {0:?}")]
    InvalidPartitionName(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
