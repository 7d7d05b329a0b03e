use async_trait::async_trait;
use url::Url;

use crate::{
    error::NetError,
    types::{Freshness, HttpResponse},
};

/// Abstraction over GET fetches.
///
/// Implementations must be cheap to share (`Arc<dyn Net>` is the common
/// shape); the worker clones one handle into every request router.
#[async_trait]
pub trait Net: Send + Sync {
    /// Fetch `url`, materializing the full response body.
    ///
    /// Returns `Ok` for any HTTP response the server produced, including
    /// error statuses; `Err` only on transport failure or timeout.
    async fn get(&self, url: Url, freshness: Freshness) -> Result<HttpResponse, NetError>;
}
