//! Activation: reconcile the live partition against the new manifest.

use cachalot_store::{CacheEntry, CacheStore, Partition};
use tracing::{debug, error, info, warn};

use crate::{
    error::{WorkerError, WorkerResult},
    manifest::{Manifest, PartitionNames, SNAPSHOT_KEY},
};

/// Run reconciliation; on any error, wipe all three partitions.
///
/// The recovery policy is deliberate "clear and restart": a half-reconciled
/// cache cannot be trusted, so the next activation starts from the
/// first-install path. The error is still surfaced (wrapped in
/// [`WorkerError::Activation`]) so drivers can log it; serving continues
/// from the now-empty live partition.
pub async fn activate<S: CacheStore>(
    store: &S,
    names: &PartitionNames,
    manifest: &Manifest,
) -> WorkerResult<()> {
    match reconcile(store, names, manifest).await {
        Ok(()) => {
            info!("activation complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "activation failed; resetting cache partitions");
            wipe(store, names).await;
            Err(WorkerError::Activation(Box::new(e)))
        }
    }
}

async fn wipe<S: CacheStore>(store: &S, names: &PartitionNames) {
    for name in [&names.live, &names.staging, &names.metadata] {
        if let Err(e) = store.delete_partition(name).await {
            warn!(partition = %name, error = %e, "failed to delete partition during reset");
        }
    }
}

async fn reconcile<S: CacheStore>(
    store: &S,
    names: &PartitionNames,
    manifest: &Manifest,
) -> WorkerResult<()> {
    let mut live = store.open_partition(&names.live).await?;
    let staging = store.open_partition(&names.staging).await?;
    let metadata = store.open_partition(&names.metadata).await?;

    match metadata.get(SNAPSHOT_KEY).await? {
        None => {
            // First install: nothing in live can be trusted.
            store.delete_partition(&names.live).await?;
            live = store.open_partition(&names.live).await?;
            debug!("no prior manifest; live partition rebuilt from staging only");
        }
        Some(snapshot) => {
            let previous = Manifest::from_json(&snapshot.body)?;
            let mut evicted = 0usize;
            for key in live.keys().await? {
                // Reuse only resources that are still referenced and whose
                // fingerprint is unchanged since the previous manifest.
                let unchanged = manifest.fingerprint(&key).is_some()
                    && manifest.fingerprint(&key) == previous.fingerprint(&key);
                if !unchanged {
                    live.delete(&key).await?;
                    evicted += 1;
                }
            }
            debug!(evicted, "reconciled live partition against previous manifest");
        }
    }

    // Promote the staged shell; freshly staged content wins ties.
    let mut promoted = 0usize;
    for key in staging.keys().await? {
        if let Some(entry) = staging.get(&key).await? {
            live.put(&key, entry).await?;
            promoted += 1;
        }
    }
    store.delete_partition(&names.staging).await?;
    debug!(promoted, "promoted staged shell entries");

    let snapshot = CacheEntry::new(
        200,
        Some("application/json".to_string()),
        manifest.to_json()?,
    );
    metadata.put(SNAPSHOT_KEY, snapshot).await?;
    Ok(())
}
