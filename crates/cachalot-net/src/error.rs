use thiserror::Error;

/// Centralized error type for cachalot-net.
///
/// Only transport-level failures live here; HTTP error statuses are carried
/// inside [`HttpResponse`](crate::HttpResponse) so callers can decide whether
/// to cache, return, or discard them.
#[derive(Debug, Error, Clone)]
pub enum NetError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("request timed out")]
    Timeout,
}

impl NetError {
    /// Checks if this error indicates a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, NetError::Timeout)
    }
}

impl From<reqwest::Error> for NetError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(error.to_string())
        }
    }
}

pub type NetResult<T> = Result<T, NetError>;
