//! Install step: stage a fresh copy of the application shell.

use cachalot_net::{Freshness, Net};
use cachalot_store::Partition;
use tracing::{debug, info};
use url::Url;

use crate::{
    error::{WorkerError, WorkerResult},
    fetch::entry_from_response,
    manifest::{Manifest, ShellSet},
    routes::resource_url,
};

/// Fetch every shell path with forced freshness and store it in `staging`.
///
/// Any transport error or non-2xx status fails the whole install: a partial
/// shell must never be promoted, so the caller discards the worker.
pub async fn install<P: Partition>(
    staging: &P,
    net: &dyn Net,
    origin: &Url,
    manifest: &Manifest,
    shell: &ShellSet,
) -> WorkerResult<()> {
    shell.validate(manifest)?;

    for path in shell.paths() {
        let url = resource_url(origin, path)?;
        let resp = net.get(url, Freshness::NoCache).await?;
        if !resp.is_success() {
            return Err(WorkerError::ShellFetch {
                path: path.clone(),
                status: resp.status,
            });
        }
        staging.put(path, entry_from_response(&resp)).await?;
        debug!(path, "staged shell resource");
    }

    info!(count = shell.len(), "shell staged");
    Ok(())
}
