//! Offline prefetch: fill every manifest entry missing from the live cache.

use std::collections::HashSet;

use cachalot_net::{Freshness, Net};
use cachalot_store::Partition;
use tracing::{info, warn};
use url::Url;

use crate::{error::WorkerResult, fetch::entry_from_response, manifest::Manifest, routes::resource_url};

/// Per-resource outcome of a bulk prefetch.
#[derive(Debug, Default)]
pub struct PrefetchReport {
    /// Keys fetched and stored by this run.
    pub fetched: Vec<String>,
    /// Keys that could not be fetched, with the reason.
    pub failed: Vec<PrefetchFailure>,
}

impl PrefetchReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug)]
pub struct PrefetchFailure {
    pub key: String,
    pub reason: String,
}

/// Fetch-and-store every manifest key absent from `live`.
///
/// Individual fetch failures do not abort the run; they are recorded in the
/// report so callers can retry or surface them. Store errors still abort —
/// a failing cache is not a per-resource condition.
pub async fn prefetch_missing<P: Partition>(
    live: &P,
    net: &dyn Net,
    origin: &Url,
    manifest: &Manifest,
) -> WorkerResult<PrefetchReport> {
    let present: HashSet<String> = live.keys().await?.into_iter().collect();
    let mut report = PrefetchReport::default();

    for key in manifest.keys() {
        if present.contains(key) {
            continue;
        }
        let url = match resource_url(origin, key) {
            Ok(url) => url,
            Err(e) => {
                report.failed.push(PrefetchFailure {
                    key: key.to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        match net.get(url, Freshness::Default).await {
            Ok(resp) if resp.is_success() => {
                live.put(key, entry_from_response(&resp)).await?;
                report.fetched.push(key.to_string());
            }
            Ok(resp) => {
                warn!(key, status = resp.status, "prefetch got error status");
                report.failed.push(PrefetchFailure {
                    key: key.to_string(),
                    reason: format!("HTTP {}", resp.status),
                });
            }
            Err(e) => {
                warn!(key, error = %e, "prefetch fetch failed");
                report.failed.push(PrefetchFailure {
                    key: key.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        fetched = report.fetched.len(),
        failed = report.failed.len(),
        "offline prefetch finished"
    );
    Ok(report)
}
