//! Async HTTP test server helpers.

use axum::Router;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use url::Url;

/// Lightweight HTTP test server wrapper.
///
/// Shuts down gracefully when dropped — tests use [`shutdown`](Self::shutdown)
/// to simulate the origin going offline mid-test.
pub struct TestHttpServer {
    base_url: Url,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestHttpServer {
    /// Spawn `router` on a random localhost port.
    ///
    /// Returns once the listener accepts connections, so tests can fire
    /// requests immediately.
    ///
    /// # Panics
    ///
    /// Panics if listener bind, the readiness probe, or URL parsing fails.
    pub async fn new(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test HTTP listener");
        let addr = listener
            .local_addr()
            .expect("read test listener local addr");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let server = axum::serve(listener, router).with_graceful_shutdown(async {
            shutdown_rx.await.ok();
        });
        tokio::spawn(async move {
            server.await.expect("run test HTTP server");
        });

        // The listener is bound before the serve task is spawned; a probe
        // connection confirms reachability without a fixed startup delay.
        TcpStream::connect(addr)
            .await
            .expect("probe test HTTP listener");

        Self {
            base_url: Url::parse(&format!("http://{addr}")).expect("parse base URL"),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Join path to server base URL.
    ///
    /// # Panics
    ///
    /// Panics if URL join fails.
    #[must_use]
    pub fn url(&self, path: &str) -> Url {
        self.base_url.join(path).expect("join server URL path")
    }

    /// Base URL of this server (the worker's origin in tests).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Shut the server down, simulating the origin going offline.
    pub fn shutdown(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}

impl Drop for TestHttpServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
