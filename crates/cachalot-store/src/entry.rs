use bytes::Bytes;

/// A cached response blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    /// HTTP status the entry was stored with.
    pub status: u16,
    /// `Content-Type` of the original response, if any.
    pub content_type: Option<String>,
    /// Response body.
    pub body: Bytes,
}

impl CacheEntry {
    pub fn new(status: u16, content_type: Option<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }
}
