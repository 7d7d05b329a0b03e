//! Stage an application shell from a live origin and prefetch the rest.
//!
//! ```sh
//! cargo run --example offline_shell -- https://app.example.com index.html main.js assets/logo.png
//! ```
//!
//! The first path is treated as the document entry; all paths are staged as
//! the shell and the manifest uses placeholder fingerprints (a real
//! deployment embeds build-generated ones).

use cachalot::{FetchOutcome, Manifest, WorkerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let origin: Url = args
        .next()
        .ok_or("usage: offline_shell <origin> <document> [paths...]")?
        .parse()?;
    let paths: Vec<String> = args.collect();
    let document = paths
        .first()
        .cloned()
        .ok_or("at least one path is required")?;

    let manifest: Manifest = paths
        .iter()
        .map(|p| (p.clone(), format!("demo-{p}")))
        .collect::<Manifest>()
        .with_root_alias(&document)?;

    let worker = WorkerConfig::new(origin.clone(), manifest)
        .with_shell(paths.clone())
        .with_cache_dir(std::env::temp_dir().join("cachalot-demo"))
        .build()?;

    worker.start().await?;
    info!(shell = paths.len(), "shell staged and activated");

    let report = worker.prefetch_offline().await?;
    info!(
        fetched = report.fetched.len(),
        failed = report.failed.len(),
        "offline prefetch done"
    );
    for failure in &report.failed {
        info!(key = %failure.key, reason = %failure.reason, "prefetch failure");
    }

    // Serve the document root once to show the interception path.
    let router = worker.router().await?;
    match router.handle_get(&origin).await? {
        FetchOutcome::Response(resp) => {
            info!(status = resp.status, len = resp.body.len(), "served document root");
        }
        FetchOutcome::Passthrough => info!("document root is not a manifest resource"),
    }

    Ok(())
}
