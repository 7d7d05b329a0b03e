//! Worker driver: lifecycle sequencing and message dispatch.

use std::sync::Arc;

use cachalot_net::Net;
use cachalot_store::CacheStore;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::{
    activate,
    error::WorkerResult,
    fetch::FetchRouter,
    install,
    lifecycle::{LifecycleGate, LifecycleState},
    manifest::{Manifest, PartitionNames, ShellSet},
    prefetch::{self, PrefetchReport},
};

/// Recognized external command signals.
///
/// Raw signals are strings; anything [`parse`](Self::parse) does not
/// recognize is ignored silently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerMessage {
    /// Activate a waiting worker immediately.
    SkipWaiting,
    /// Bulk-populate every manifest entry missing from the live cache.
    DownloadOffline,
}

impl WorkerMessage {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "skipWaiting" => Some(Self::SkipWaiting),
            "downloadOffline" => Some(Self::DownloadOffline),
            _ => None,
        }
    }
}

/// One worker instance: owns the store, network seam, manifest, and gate.
///
/// All handlers receive the partitions they operate on explicitly; there is
/// no ambient cache state.
pub struct ServiceWorker<S: CacheStore> {
    store: S,
    net: Arc<dyn Net>,
    origin: Url,
    manifest: Arc<Manifest>,
    shell: ShellSet,
    partitions: PartitionNames,
    gate: LifecycleGate,
    cancel: CancellationToken,
}

impl<S: CacheStore> ServiceWorker<S> {
    /// Create a worker. Fails if a shell path does not resolve in the
    /// manifest.
    pub fn new(
        store: S,
        net: Arc<dyn Net>,
        origin: Url,
        manifest: Manifest,
        shell: ShellSet,
        partitions: PartitionNames,
        cancel: CancellationToken,
    ) -> WorkerResult<Self> {
        shell.validate(&manifest)?;
        Ok(Self {
            store,
            net,
            origin,
            manifest: Arc::new(manifest),
            shell,
            partitions,
            gate: LifecycleGate::new(),
            cancel,
        })
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.gate.state()
    }

    #[must_use]
    pub fn gate(&self) -> &LifecycleGate {
        &self.gate
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Install: stage the shell. On failure the worker goes redundant.
    pub async fn install(&self) -> WorkerResult<()> {
        self.gate.set(LifecycleState::Installing);
        let staging = self.store.open_partition(&self.partitions.staging).await?;
        match install::install(
            &staging,
            self.net.as_ref(),
            &self.origin,
            &self.manifest,
            &self.shell,
        )
        .await
        {
            Ok(()) => {
                self.gate.set(LifecycleState::Installed);
                Ok(())
            }
            Err(e) => {
                self.gate.set(LifecycleState::Redundant);
                Err(e)
            }
        }
    }

    /// Activate: reconcile and promote. The worker reaches `Activated` even
    /// when reconciliation fails — the partitions were reset and requests
    /// are served from an empty live cache until lazily repopulated.
    pub async fn activate(&self) -> WorkerResult<()> {
        self.gate.set(LifecycleState::Activating);
        let result = activate::activate(&self.store, &self.partitions, &self.manifest).await;
        self.gate.set(LifecycleState::Activated);
        result
    }

    /// Install then activate (skip-waiting is implicit in this driver).
    pub async fn start(&self) -> WorkerResult<()> {
        self.install().await?;
        self.activate().await
    }

    /// Router for intercepted requests; clone one per concurrent caller.
    pub async fn router(&self) -> WorkerResult<FetchRouter<S::Partition>> {
        let live = self.store.open_partition(&self.partitions.live).await?;
        Ok(FetchRouter::new(
            Arc::clone(&self.manifest),
            self.origin.clone(),
            live,
            Arc::clone(&self.net),
            self.gate.clone(),
        ))
    }

    /// Fill every manifest entry missing from the live partition.
    pub async fn prefetch_offline(&self) -> WorkerResult<PrefetchReport> {
        let live = self.store.open_partition(&self.partitions.live).await?;
        prefetch::prefetch_missing(&live, self.net.as_ref(), &self.origin, &self.manifest).await
    }

    /// Handle a raw command signal; unrecognized signals are ignored.
    pub async fn on_message(&self, raw: &str) {
        match WorkerMessage::parse(raw) {
            Some(msg) => self.dispatch(msg).await,
            None => trace!(raw, "ignoring unrecognized message"),
        }
    }

    /// Dispatch a parsed command signal.
    pub async fn dispatch(&self, msg: WorkerMessage) {
        match msg {
            WorkerMessage::SkipWaiting => {
                if self.gate.state() < LifecycleState::Activating {
                    if let Err(e) = self.activate().await {
                        warn!(error = %e, "skipWaiting activation failed");
                    }
                } else {
                    debug!("skipWaiting ignored; worker already activating or active");
                }
            }
            WorkerMessage::DownloadOffline => match self.prefetch_offline().await {
                Ok(report) if report.is_complete() => {
                    info!(fetched = report.fetched.len(), "offline download complete");
                }
                Ok(report) => {
                    warn!(
                        fetched = report.fetched.len(),
                        failed = report.failed.len(),
                        "offline download incomplete"
                    );
                }
                Err(e) => warn!(error = %e, "offline download failed"),
            },
        }
    }

    /// Run the full lifecycle on a background task: install, immediate
    /// activation, then the message loop until cancellation.
    pub fn spawn(self: Arc<Self>) -> WorkerHandle {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let gate = self.gate.clone();
        let cancel = self.cancel.clone();

        let task = tokio::spawn(async move {
            if let Err(e) = self.install().await {
                error!(error = %e, "install failed; worker discarded");
                return;
            }
            // Activation failure is logged and recovered (partitions reset)
            // inside activate(); the worker keeps serving either way.
            let _ = self.activate().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Some(msg) => self.dispatch(msg).await,
                        None => break,
                    },
                }
            }
        });

        WorkerHandle {
            messages: tx,
            gate,
            task,
        }
    }
}

/// Handle to a spawned worker task.
pub struct WorkerHandle {
    messages: mpsc::UnboundedSender<WorkerMessage>,
    gate: LifecycleGate,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Send a command signal. Returns false if the worker task is gone.
    pub fn send(&self, msg: WorkerMessage) -> bool {
        self.messages.send(msg).is_ok()
    }

    /// Parse and send a raw signal; unrecognized signals are dropped.
    pub fn send_raw(&self, raw: &str) -> bool {
        match WorkerMessage::parse(raw) {
            Some(msg) => self.send(msg),
            None => {
                trace!(raw, "ignoring unrecognized message");
                false
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.gate.state()
    }

    #[must_use]
    pub fn gate(&self) -> &LifecycleGate {
        &self.gate
    }

    /// Wait for the worker task to finish (after cancellation).
    pub async fn join(self) {
        let _ = self.task.await;
    }
}
