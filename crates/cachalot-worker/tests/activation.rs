//! Reconciliation properties: fresh install, fingerprint reuse, eviction,
//! and the wipe-everything recovery path.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use cachalot_net::HttpClient;
use cachalot_store::{
    CacheEntry, CacheStore, MemPartition, MemStore, Partition, StoreError, StoreResult,
};
use cachalot_test_utils::{StaticSite, TestHttpServer};
use cachalot_worker::{
    FetchOutcome, Manifest, PartitionNames, SNAPSHOT_KEY, ServiceWorker, ShellSet, WorkerError,
};
use rstest::rstest;
use tokio_util::sync::CancellationToken;
use url::Url;

fn manifest_v1() -> Manifest {
    Manifest::from_iter([
        ("/", "h-root-1"),
        ("index.html", "h-root-1"),
        ("a.js", "h-a-1"),
        ("b.js", "h-b-1"),
    ])
}

fn site_v1() -> StaticSite {
    let site = StaticSite::new();
    site.insert("/", "<root v1>");
    site.insert("index.html", "<root v1>");
    site.insert("a.js", "a-v1");
    site.insert("b.js", "b-v1");
    site
}

fn worker<S: CacheStore>(
    store: S,
    origin: &Url,
    manifest: Manifest,
    shell: &[&str],
) -> ServiceWorker<S> {
    ServiceWorker::new(
        store,
        Arc::new(HttpClient::default()),
        origin.clone(),
        manifest,
        ShellSet::new(shell.iter().copied()),
        PartitionNames::default(),
        CancellationToken::new(),
    )
    .expect("construct worker")
}

async fn sorted_keys<P: Partition>(part: &P) -> Vec<String> {
    let mut keys = part.keys().await.unwrap();
    keys.sort();
    keys
}

#[rstest]
#[timeout(Duration::from_secs(10))]
#[tokio::test]
async fn fresh_install_populates_live_from_shell_only() {
    let site = site_v1();
    let server = TestHttpServer::new(site.router()).await;
    let store = MemStore::new();
    let names = PartitionNames::default();

    let w = worker(store.clone(), server.base_url(), manifest_v1(), &["a.js"]);
    w.start().await.unwrap();

    // P1: live contains exactly the shell entries.
    let live = store.open_partition(&names.live).await.unwrap();
    assert_eq!(sorted_keys(&live).await, vec!["a.js"]);
    assert_eq!(
        live.get("a.js").await.unwrap().unwrap().body.as_ref(),
        b"a-v1"
    );

    // Shell was fetched with forced freshness.
    assert_eq!(site.fresh_hits("a.js"), 1);

    // Snapshot equals the current manifest; staging is gone.
    let metadata = store.open_partition(&names.metadata).await.unwrap();
    let snapshot = metadata.get(SNAPSHOT_KEY).await.unwrap().unwrap();
    assert_eq!(Manifest::from_json(&snapshot.body).unwrap(), manifest_v1());
    let staging = store.open_partition(&names.staging).await.unwrap();
    assert!(sorted_keys(&staging).await.is_empty());
}

#[rstest]
#[timeout(Duration::from_secs(10))]
#[tokio::test]
async fn unchanged_fingerprint_is_reused_without_refetch() {
    let site = site_v1();
    let server = TestHttpServer::new(site.router()).await;
    let store = MemStore::new();
    let names = PartitionNames::default();

    let v1 = worker(store.clone(), server.base_url(), manifest_v1(), &["a.js"]);
    v1.start().await.unwrap();

    // Lazily populate b.js.
    let router = v1.router().await.unwrap();
    let outcome = router.handle_get(&server.url("/b.js")).await.unwrap();
    assert!(matches!(outcome, FetchOutcome::Response(r) if r.body.as_ref() == b"b-v1"));
    assert_eq!(site.hits("b.js"), 1);

    // New version: a.js changed, b.js unchanged.
    let v2_manifest = Manifest::from_iter([
        ("/", "h-root-1"),
        ("index.html", "h-root-1"),
        ("a.js", "h-a-2"),
        ("b.js", "h-b-1"),
    ]);
    site.insert("a.js", "a-v2");
    let v2 = worker(store.clone(), server.base_url(), v2_manifest, &["a.js"]);
    v2.start().await.unwrap();

    // P2: b.js survived reconciliation without another network fetch.
    let live = store.open_partition(&names.live).await.unwrap();
    assert_eq!(
        live.get("b.js").await.unwrap().unwrap().body.as_ref(),
        b"b-v1"
    );
    assert_eq!(site.hits("b.js"), 1);

    // The shell was re-staged fresh regardless.
    assert_eq!(
        live.get("a.js").await.unwrap().unwrap().body.as_ref(),
        b"a-v2"
    );
    assert_eq!(site.fresh_hits("a.js"), 2);
}

#[rstest]
#[timeout(Duration::from_secs(10))]
#[tokio::test]
async fn changed_fingerprint_is_evicted_and_refetched_lazily() {
    let site = site_v1();
    let server = TestHttpServer::new(site.router()).await;
    let store = MemStore::new();
    let names = PartitionNames::default();

    let v1 = worker(store.clone(), server.base_url(), manifest_v1(), &["a.js"]);
    v1.start().await.unwrap();
    let router = v1.router().await.unwrap();
    router.handle_get(&server.url("/b.js")).await.unwrap();
    assert_eq!(site.hits("b.js"), 1);

    // b.js content changed in the new deployment.
    let v2_manifest = Manifest::from_iter([
        ("/", "h-root-1"),
        ("index.html", "h-root-1"),
        ("a.js", "h-a-1"),
        ("b.js", "h-b-2"),
    ]);
    site.insert("b.js", "b-v2");
    let v2 = worker(store.clone(), server.base_url(), v2_manifest, &["a.js"]);
    v2.start().await.unwrap();

    // P3: evicted at activation.
    let live = store.open_partition(&names.live).await.unwrap();
    assert_eq!(live.get("b.js").await.unwrap(), None);

    // Refetched lazily on the next request.
    let router = v2.router().await.unwrap();
    let outcome = router.handle_get(&server.url("/b.js")).await.unwrap();
    assert!(matches!(outcome, FetchOutcome::Response(r) if r.body.as_ref() == b"b-v2"));
    assert_eq!(site.hits("b.js"), 2);
}

#[rstest]
#[timeout(Duration::from_secs(10))]
#[tokio::test]
async fn removed_resource_is_evicted_and_never_reappears() {
    let site = site_v1();
    let server = TestHttpServer::new(site.router()).await;
    let store = MemStore::new();
    let names = PartitionNames::default();

    let v1 = worker(store.clone(), server.base_url(), manifest_v1(), &["a.js"]);
    v1.start().await.unwrap();
    let router = v1.router().await.unwrap();
    router.handle_get(&server.url("/b.js")).await.unwrap();

    // b.js dropped from the manifest entirely.
    let v2_manifest = Manifest::from_iter([
        ("/", "h-root-1"),
        ("index.html", "h-root-1"),
        ("a.js", "h-a-1"),
    ]);
    let v2 = worker(store.clone(), server.base_url(), v2_manifest, &["a.js"]);
    v2.start().await.unwrap();

    // P4: gone from live, not in prefetch scope, and passthrough on request.
    let live = store.open_partition(&names.live).await.unwrap();
    assert_eq!(live.get("b.js").await.unwrap(), None);

    let report = v2.prefetch_offline().await.unwrap();
    assert!(!report.fetched.iter().any(|k| k == "b.js"));

    let router = v2.router().await.unwrap();
    let outcome = router.handle_get(&server.url("/b.js")).await.unwrap();
    assert!(matches!(outcome, FetchOutcome::Passthrough));
}

#[rstest]
#[timeout(Duration::from_secs(10))]
#[tokio::test]
async fn key_without_snapshot_fingerprint_is_evicted_even_if_referenced() {
    let site = site_v1();
    site.insert("c.png", "c-v1");
    let server = TestHttpServer::new(site.router()).await;
    let store = MemStore::new();
    let names = PartitionNames::default();

    // v1 knows nothing about c.png.
    let v1 = worker(store.clone(), server.base_url(), manifest_v1(), &["a.js"]);
    v1.start().await.unwrap();

    // Plant a c.png entry in live that the v1 snapshot cannot vouch for.
    let live = store.open_partition(&names.live).await.unwrap();
    live.put(
        "c.png",
        CacheEntry::new(200, Some("image/png".to_string()), "c-stale"),
    )
    .await
    .unwrap();

    // v2 references c.png, but with no v1 fingerprint to compare against the
    // planted entry must be evicted rather than reused.
    let mut v2_manifest = manifest_v1();
    v2_manifest.insert("c.png", "h-c-1");
    let v2 = worker(store.clone(), server.base_url(), v2_manifest, &["a.js"]);
    v2.start().await.unwrap();

    assert_eq!(live.get("c.png").await.unwrap(), None);

    // It comes back lazily, from the network, with current content.
    let router = v2.router().await.unwrap();
    let outcome = router.handle_get(&server.url("/c.png")).await.unwrap();
    assert!(matches!(outcome, FetchOutcome::Response(r) if r.body.as_ref() == b"c-v1"));
}

#[rstest]
#[timeout(Duration::from_secs(10))]
#[tokio::test]
async fn two_version_upgrade_end_to_end() {
    // v1 = {a.js: h1, b.js: h2}, shell = [a.js].
    let site = StaticSite::new();
    site.insert("a.js", "a-v1");
    site.insert("b.js", "b-v1");
    let server = TestHttpServer::new(site.router()).await;
    let store = MemStore::new();
    let names = PartitionNames::default();

    let v1_manifest = Manifest::from_iter([("a.js", "h1"), ("b.js", "h2")]);
    let v1 = worker(store.clone(), server.base_url(), v1_manifest, &["a.js"]);
    v1.start().await.unwrap();

    // First activation populates live only from the staged shell.
    let live = store.open_partition(&names.live).await.unwrap();
    assert_eq!(sorted_keys(&live).await, vec!["a.js"]);

    // b.js arrives only on first request.
    let router = v1.router().await.unwrap();
    router.handle_get(&server.url("/b.js")).await.unwrap();
    assert_eq!(sorted_keys(&live).await, vec!["a.js", "b.js"]);

    // v2 = {a.js: h1, b.js: h3}: b.js evicted, a.js re-staged regardless.
    let v2_manifest = Manifest::from_iter([("a.js", "h1"), ("b.js", "h3")]);
    let v2 = worker(store.clone(), server.base_url(), v2_manifest, &["a.js"]);
    v2.start().await.unwrap();

    assert_eq!(sorted_keys(&live).await, vec!["a.js"]);
    assert_eq!(site.fresh_hits("a.js"), 2);
}

// ---------------------------------------------------------------------------
// Fault injection: any reconciliation error wipes all three partitions.
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct FaultStore {
    inner: MemStore,
    fail_keys: Arc<AtomicBool>,
}

#[derive(Clone)]
struct FaultPartition {
    inner: MemPartition,
    fail_keys: Arc<AtomicBool>,
}

#[async_trait]
impl CacheStore for FaultStore {
    type Partition = FaultPartition;

    async fn open_partition(&self, name: &str) -> StoreResult<Self::Partition> {
        Ok(FaultPartition {
            inner: self.inner.open_partition(name).await?,
            fail_keys: Arc::clone(&self.fail_keys),
        })
    }

    async fn delete_partition(&self, name: &str) -> StoreResult<()> {
        self.inner.delete_partition(name).await
    }
}

#[async_trait]
impl Partition for FaultPartition {
    async fn get(&self, key: &str) -> StoreResult<Option<CacheEntry>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, entry: CacheEntry) -> StoreResult<()> {
        self.inner.put(key, entry).await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.inner.delete(key).await
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        if self.fail_keys.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("injected fault")));
        }
        self.inner.keys().await
    }
}

#[rstest]
#[timeout(Duration::from_secs(10))]
#[tokio::test]
async fn activation_error_wipes_all_partitions() {
    let site = site_v1();
    let server = TestHttpServer::new(site.router()).await;
    let mem = MemStore::new();
    let names = PartitionNames::default();

    // Healthy first run leaves a snapshot and cached content behind.
    let v1 = worker(mem.clone(), server.base_url(), manifest_v1(), &["a.js"]);
    v1.start().await.unwrap();
    let router = v1.router().await.unwrap();
    router.handle_get(&server.url("/b.js")).await.unwrap();

    // Second run hits an injected store fault mid-reconciliation.
    let fail_keys = Arc::new(AtomicBool::new(true));
    let faulty = FaultStore {
        inner: mem.clone(),
        fail_keys: Arc::clone(&fail_keys),
    };
    let v2 = worker(faulty, server.base_url(), manifest_v1(), &["a.js"]);
    let err = v2.start().await.unwrap_err();
    assert!(matches!(err, WorkerError::Activation(_)), "{err:?}");

    // All three partitions were deleted — the cache starts over.
    fail_keys.store(false, Ordering::SeqCst);
    for name in [&names.live, &names.staging, &names.metadata] {
        let part = mem.open_partition(name).await.unwrap();
        assert!(
            part.keys().await.unwrap().is_empty(),
            "partition {name} not wiped"
        );
    }

    // The next activation takes the first-install path and succeeds.
    let v3 = worker(mem.clone(), server.base_url(), manifest_v1(), &["a.js"]);
    v3.start().await.unwrap();
    let live = mem.open_partition(&names.live).await.unwrap();
    assert_eq!(sorted_keys(&live).await, vec!["a.js"]);
}
