//! Request → logical-key normalization and routing policy selection.

use url::Url;

use crate::{
    error::{WorkerError, WorkerResult},
    manifest::{Manifest, ROOT_ALIAS},
};

/// Routing decision for one intercepted request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// Not handled here; the caller's default network handling applies.
    Passthrough,
    /// Document root: network first, cached fallback.
    OnlineFirst,
    /// Manifest resource: cache first, lazy network population.
    CacheFirst(String),
}

/// Compute the logical manifest key for a request URL.
///
/// Returns `None` when the URL is not under `origin`. Otherwise the key is
/// the path relative to the origin with a trailing `?v=...` version query
/// stripped; the bare origin, an empty path, and fragment routes (`#...`)
/// normalize to [`ROOT_ALIAS`].
#[must_use]
pub fn logical_key(origin: &Url, request: &Url) -> Option<String> {
    let origin_str = origin.as_str().trim_end_matches('/');
    let request_str = request.as_str();

    if request_str == origin_str {
        return Some(ROOT_ALIAS.to_string());
    }
    let rest = request_str
        .strip_prefix(origin_str)?
        .strip_prefix('/')?;

    // Strip a version query; anything after `?v=` is a cache-buster.
    let key = match rest.split_once("?v=") {
        Some((before, _)) => before,
        None => rest,
    };

    if key.is_empty() || key.starts_with('#') {
        return Some(ROOT_ALIAS.to_string());
    }
    Some(key.to_string())
}

/// Decide how to handle an intercepted request.
#[must_use]
pub fn route_request(manifest: &Manifest, origin: &Url, method: &str, url: &Url) -> Route {
    if !method.eq_ignore_ascii_case("GET") {
        return Route::Passthrough;
    }
    let Some(key) = logical_key(origin, url) else {
        return Route::Passthrough;
    };
    if !manifest.contains(&key) {
        return Route::Passthrough;
    }
    if key == ROOT_ALIAS {
        Route::OnlineFirst
    } else {
        Route::CacheFirst(key)
    }
}

/// Resolve a logical key back to its request URL under `origin`.
pub fn resource_url(origin: &Url, key: &str) -> WorkerResult<Url> {
    let target = if key == ROOT_ALIAS { "/" } else { key };
    origin
        .join(target)
        .map_err(|source| WorkerError::ResourceUrl {
            key: key.to_string(),
            source,
        })
}
