//! Scripted static origin for worker tests.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header},
    response::IntoResponse,
};
use bytes::Bytes;
use dashmap::DashMap;

/// A mutable path → body map served over HTTP, with per-path hit counters.
///
/// Counters let tests assert "this resource was (not) refetched" — the
/// backbone of the fingerprint-reuse and eviction properties. `fresh_hits`
/// counts requests that carried `Cache-Control: no-cache`, i.e. forced-fresh
/// shell staging.
#[derive(Clone, Default)]
pub struct StaticSite {
    files: Arc<DashMap<String, Bytes>>,
    hits: Arc<DashMap<String, usize>>,
    fresh_hits: Arc<DashMap<String, usize>>,
}

impl StaticSite {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `body` under `path` (`"/"` for the document root, plain
    /// relative paths like `"a.js"` otherwise).
    pub fn insert(&self, path: &str, body: impl Into<Bytes>) {
        self.files.insert(path.to_string(), body.into());
    }

    /// Remove a path, simulating a deleted deployment artifact.
    pub fn remove(&self, path: &str) {
        self.files.remove(path);
    }

    /// Total requests served for `path` (any status).
    #[must_use]
    pub fn hits(&self, path: &str) -> usize {
        self.hits.get(path).map(|h| *h).unwrap_or(0)
    }

    /// Requests for `path` that carried `Cache-Control: no-cache`.
    #[must_use]
    pub fn fresh_hits(&self, path: &str) -> usize {
        self.fresh_hits.get(path).map(|h| *h).unwrap_or(0)
    }

    /// Router serving this site; every path goes through the fallback.
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new().fallback(serve).with_state(self.clone())
    }
}

async fn serve(
    State(site): State<StaticSite>,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    let path = uri.path();
    let key = if path == "/" {
        "/".to_string()
    } else {
        path.trim_start_matches('/').to_string()
    };

    *site.hits.entry(key.clone()).or_insert(0) += 1;
    let no_cache = headers
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("no-cache"));
    if no_cache {
        *site.fresh_hits.entry(key.clone()).or_insert(0) += 1;
    }

    match site.files.get(&key) {
        Some(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            body.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
