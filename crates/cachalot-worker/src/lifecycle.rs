//! Worker lifecycle states and the gate request routing waits on.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Lifecycle states, in progression order.
///
/// `Redundant` sorts after `Activated` so that gate waiters parked on
/// "activated or later" also wake when the worker is discarded; they must
/// re-check the state after waking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    New,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

/// Watch-backed lifecycle gate.
///
/// Cheap to clone; every [`FetchRouter`](crate::FetchRouter) holds one and
/// awaits activation before touching the live partition, making the
/// "reconciliation completes before any request is served" ordering explicit
/// rather than host-enforced.
#[derive(Clone, Debug)]
pub struct LifecycleGate {
    tx: Arc<watch::Sender<LifecycleState>>,
    rx: watch::Receiver<LifecycleState>,
}

impl LifecycleGate {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(LifecycleState::New);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    pub fn set(&self, state: LifecycleState) {
        debug!(?state, "lifecycle transition");
        self.tx.send_replace(state);
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        *self.rx.borrow()
    }

    /// Wait until the state reaches `target` or later.
    pub async fn wait_for(&self, target: LifecycleState) {
        let mut rx = self.rx.clone();
        // The sender lives inside this gate, so this only fails once every
        // clone of the gate is gone — nothing is left to wait for then.
        let _ = rx.wait_for(|s| *s >= target).await;
    }
}

impl Default for LifecycleGate {
    fn default() -> Self {
        Self::new()
    }
}
