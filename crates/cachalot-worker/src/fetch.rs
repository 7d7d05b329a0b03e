//! Request interception: cache-first and online-first policies.

use std::sync::Arc;

use cachalot_net::{Freshness, HttpResponse, Net};
use cachalot_store::{CacheEntry, Partition};
use tracing::{debug, trace};
use url::Url;

use crate::{
    error::{WorkerError, WorkerResult},
    lifecycle::{LifecycleGate, LifecycleState},
    manifest::{Manifest, ROOT_ALIAS},
    routes::{Route, route_request},
};

/// Outcome of handling one intercepted request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Not a manifest resource (or not a GET); let default handling serve it.
    Passthrough,
    /// A response, either cached or freshly fetched.
    Response(HttpResponse),
}

/// Stateless per-request router over the live partition.
///
/// Cheap to clone; concurrent requests each run on their own clone. The
/// match-then-put sequence is not atomic across concurrent misses for the
/// same key, which is benign: both fetch the same fingerprinted content and
/// writes are last-writer-wins with identical bytes.
#[derive(Clone)]
pub struct FetchRouter<P: Partition> {
    manifest: Arc<Manifest>,
    origin: Url,
    live: P,
    net: Arc<dyn Net>,
    gate: LifecycleGate,
}

impl<P: Partition> FetchRouter<P> {
    pub(crate) fn new(
        manifest: Arc<Manifest>,
        origin: Url,
        live: P,
        net: Arc<dyn Net>,
        gate: LifecycleGate,
    ) -> Self {
        Self {
            manifest,
            origin,
            live,
            net,
            gate,
        }
    }

    /// Handle an intercepted request.
    ///
    /// Waits for activation to complete before touching the live partition.
    pub async fn handle(&self, method: &str, url: &Url) -> WorkerResult<FetchOutcome> {
        self.gate.wait_for(LifecycleState::Activated).await;
        if self.gate.state() == LifecycleState::Redundant {
            return Err(WorkerError::Discarded);
        }

        match route_request(&self.manifest, &self.origin, method, url) {
            Route::Passthrough => {
                trace!(%url, method, "passthrough");
                Ok(FetchOutcome::Passthrough)
            }
            Route::OnlineFirst => self.online_first(url).await.map(FetchOutcome::Response),
            Route::CacheFirst(key) => self
                .cache_first(&key, url)
                .await
                .map(FetchOutcome::Response),
        }
    }

    /// Convenience for the common case.
    pub async fn handle_get(&self, url: &Url) -> WorkerResult<FetchOutcome> {
        self.handle("GET", url).await
    }

    /// Cache-first: serve the cached entry, or fetch and lazily populate.
    ///
    /// Only successful responses are cached; error responses are returned
    /// uncached and transport failures propagate without a cached fallback
    /// (cache-first resources are expected to be cached from activation).
    async fn cache_first(&self, key: &str, url: &Url) -> WorkerResult<HttpResponse> {
        if let Some(entry) = self.live.get(key).await? {
            trace!(key, "cache hit");
            return Ok(response_from_entry(entry));
        }

        let resp = self.net.get(url.clone(), Freshness::Default).await?;
        if resp.is_success() {
            self.live.put(key, entry_from_response(&resp)).await?;
            debug!(key, "lazily cached after miss");
        }
        Ok(resp)
    }

    /// Online-first (document root only): prefer network freshness, fall
    /// back to the cached copy, re-raise the network error if none exists.
    async fn online_first(&self, url: &Url) -> WorkerResult<HttpResponse> {
        match self.net.get(url.clone(), Freshness::Default).await {
            Ok(resp) => {
                self.live
                    .put(ROOT_ALIAS, entry_from_response(&resp))
                    .await?;
                Ok(resp)
            }
            Err(net_err) => match self.live.get(ROOT_ALIAS).await? {
                Some(entry) => {
                    debug!("root served from cache after network failure");
                    Ok(response_from_entry(entry))
                }
                None => Err(net_err.into()),
            },
        }
    }
}

pub(crate) fn entry_from_response(resp: &HttpResponse) -> CacheEntry {
    CacheEntry {
        status: resp.status,
        content_type: resp.content_type.clone(),
        body: resp.body.clone(),
    }
}

pub(crate) fn response_from_entry(entry: CacheEntry) -> HttpResponse {
    HttpResponse {
        status: entry.status,
        content_type: entry.content_type,
        body: entry.body,
    }
}
