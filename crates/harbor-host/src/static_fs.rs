//! Filesystem-backed static asset store

use async_trait::async_trait;
use bytes::Bytes;
use harbor_core::collab::{StaticAsset, StaticAssets};
use harbor_core::Result;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Serves files from a directory on disk.
///
/// Request paths are resolved strictly inside the root: any path component
/// that is not a plain name (`..`, absolute segments) is treated as a miss,
/// never an escape.
#[derive(Debug, Clone)]
pub struct FsStaticAssets {
    root: PathBuf,
    prefix: String,
}

impl FsStaticAssets {
    /// Create a store serving `root` under `prefix`
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let rel = path.strip_prefix(&self.prefix)?.trim_start_matches('/');
        if rel.is_empty() {
            return None;
        }

        let rel = Path::new(rel);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            tracing::warn!(path = %path, "rejected static path with non-plain components");
            return None;
        }

        Some(self.root.join(rel))
    }
}

#[async_trait]
impl StaticAssets for FsStaticAssets {
    async fn fetch(&self, path: &str) -> Result<Option<StaticAsset>> {
        let Some(full) = self.resolve(path) else {
            return Ok(None);
        };

        match tokio::fs::metadata(&full).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let bytes = tokio::fs::read(&full).await?;
        Ok(Some(StaticAsset {
            bytes: Bytes::from(bytes),
            content_type: content_type_for(&full).to_string(),
        }))
    }
}

/// MIME type from the file extension, octet-stream when unknown
fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    match ext {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "woff2" => "font/woff2",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
