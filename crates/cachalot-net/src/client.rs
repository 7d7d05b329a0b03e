use async_trait::async_trait;
use reqwest::Client;
use tracing::trace;
use url::Url;

use crate::{
    error::{NetError, NetResult},
    traits::Net,
    types::{Freshness, HttpResponse, NetOptions},
};

/// `reqwest`-backed [`Net`] implementation.
#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: Client,
    options: NetOptions,
}

impl HttpClient {
    /// # Panics
    ///
    /// Panics if the `reqwest::Client` builder fails to build.
    #[must_use]
    pub fn new(options: NetOptions) -> Self {
        let inner = Client::builder()
            .pool_max_idle_per_host(options.pool_max_idle_per_host)
            .build()
            .expect("failed to build reqwest client");
        Self { inner, options }
    }

    /// # Errors
    ///
    /// Returns [`NetError`] on transport failure or timeout.
    pub async fn get(&self, url: Url, freshness: Freshness) -> NetResult<HttpResponse> {
        <Self as Net>::get(self, url, freshness).await
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(NetOptions::default())
    }
}

#[async_trait]
impl Net for HttpClient {
    async fn get(&self, url: Url, freshness: Freshness) -> Result<HttpResponse, NetError> {
        let mut req = self.inner.get(url.clone());
        if freshness == Freshness::NoCache {
            req = req
                .header("Cache-Control", "no-cache")
                .header("Pragma", "no-cache");
        }
        if let Some(timeout) = self.options.request_timeout {
            req = req.timeout(timeout);
        }

        let resp = req.send().await.map_err(NetError::from)?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await.map_err(NetError::from)?;

        trace!(%url, status, len = body.len(), "fetched");
        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}
