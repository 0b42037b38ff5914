//! Static asset collaborator consumed by the router's fallback

use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// A servable static file
#[derive(Debug, Clone)]
pub struct StaticAsset {
    /// File contents
    pub bytes: Bytes,
    /// MIME type for the Content-Type header
    pub content_type: String,
}

/// Opaque static file store.
///
/// `None` is the not-found signal; the dispatcher then reports the request
/// as unmatched rather than inventing a response.
#[async_trait]
pub trait StaticAssets: Send + Sync {
    /// Fetch an asset by request path
    async fn fetch(&self, path: &str) -> Result<Option<StaticAsset>>;
}
