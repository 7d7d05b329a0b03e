use std::time::Duration;

use cachalot_net::{Freshness, HttpClient, NetError, NetOptions};
use cachalot_test_utils::{StaticSite, TestHttpServer};
use rstest::*;

#[fixture]
fn site() -> StaticSite {
    let site = StaticSite::new();
    site.insert("/", "<html>root</html>");
    site.insert("a.js", "alert(1)");
    site
}

#[fixture]
fn client() -> HttpClient {
    HttpClient::new(NetOptions::default())
}

#[rstest]
#[case("/", b"<html>root</html>".as_slice())]
#[case("/a.js", b"alert(1)".as_slice())]
#[timeout(Duration::from_secs(5))]
#[tokio::test]
async fn get_materializes_body(
    site: StaticSite,
    client: HttpClient,
    #[case] path: &str,
    #[case] expected: &[u8],
) {
    let server = TestHttpServer::new(site.router()).await;
    let resp = client
        .get(server.url(path), Freshness::Default)
        .await
        .unwrap();

    assert!(resp.is_success());
    assert_eq!(resp.body, expected);
    assert_eq!(resp.content_type.as_deref(), Some("application/octet-stream"));
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test]
async fn missing_path_is_ok_with_error_status(site: StaticSite, client: HttpClient) {
    let server = TestHttpServer::new(site.router()).await;
    let resp = client
        .get(server.url("/nope.js"), Freshness::Default)
        .await
        .unwrap();

    // Non-2xx is a materialized response, not a NetError.
    assert!(!resp.is_success());
    assert_eq!(resp.status, 404);
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test]
async fn no_cache_freshness_sets_header(site: StaticSite, client: HttpClient) {
    let server = TestHttpServer::new(site.router()).await;

    client
        .get(server.url("/a.js"), Freshness::Default)
        .await
        .unwrap();
    assert_eq!(site.fresh_hits("a.js"), 0);

    client
        .get(server.url("/a.js"), Freshness::NoCache)
        .await
        .unwrap();
    assert_eq!(site.fresh_hits("a.js"), 1);
    assert_eq!(site.hits("a.js"), 2);
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test]
async fn offline_origin_is_transport_error(site: StaticSite, client: HttpClient) {
    let mut server = TestHttpServer::new(site.router()).await;
    let url = server.url("/a.js");
    server.shutdown();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let err = client.get(url, Freshness::Default).await.unwrap_err();
    assert!(matches!(err, NetError::Http(_) | NetError::Timeout));
}

#[rstest]
#[timeout(Duration::from_secs(5))]
#[tokio::test]
async fn request_timeout_maps_to_timeout_error() {
    use axum::{Router, routing::get};

    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_secs(2)).await;
        "too late"
    }

    let server = TestHttpServer::new(Router::new().route("/slow", get(slow))).await;
    let client = HttpClient::new(NetOptions {
        request_timeout: Some(Duration::from_millis(100)),
        ..NetOptions::default()
    });

    let err = client
        .get(server.url("/slow"), Freshness::Default)
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err:?}");
}
