use std::time::Duration;

use bytes::Bytes;

/// Cache behavior requested for a single fetch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Freshness {
    /// Normal HTTP caching semantics.
    #[default]
    Default,
    /// Bypass intermediate caches (`Cache-Control: no-cache`).
    ///
    /// Used when staging the application shell, where the fetched bytes must
    /// reflect the deployed version, not a proxy's copy.
    NoCache,
}

/// Options for constructing an [`HttpClient`](crate::HttpClient).
#[derive(Clone, Debug)]
pub struct NetOptions {
    /// Per-request timeout. `None` leaves in-flight fetches unbounded.
    pub request_timeout: Option<Duration>,
    /// Max idle connections kept per host.
    pub pool_max_idle_per_host: usize,
}

impl Default for NetOptions {
    fn default() -> Self {
        Self {
            request_timeout: None,
            pool_max_idle_per_host: 4,
        }
    }
}

/// A fully materialized HTTP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, if the server sent one.
    pub content_type: Option<String>,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Whether the status indicates success (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
