//! Local Backend
//!
//! Stores each entry as a single framed file under a private per-process
//! temporary directory. The directory is created lazily on first use, named
//! `ssr-cache-<pid>-<random>` so the stale directory reaper can recover the
//! owning pid, and removed when the backend is dropped.

use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::TempDir;
use tokio::fs;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::backend::{CacheBackend, RawEntry};
use crate::cache::entry::{decode_frame, encode_frame, EntryMetadata};
use crate::error::Result;
use crate::keys::Sanitizer;
use crate::models::Namespace;
use crate::tasks;

// == Local Backend ==
/// Filesystem-backed cache storage.
pub struct LocalBackend {
    sanitizer: Sanitizer,
    // Write-once per instance; holding the TempDir removes the directory
    // when the backend is dropped.
    dir: OnceCell<TempDir>,
}

impl LocalBackend {
    /// Creates a local backend. The first construction in a process also
    /// triggers the stale directory reaper.
    pub fn new() -> Self {
        tasks::reap_stale_dirs_once();
        Self {
            sanitizer: Sanitizer::local(),
            dir: OnceCell::new(),
        }
    }

    /// The cache root, created on first use.
    async fn cache_root(&self) -> Result<&Path> {
        let dir = self
            .dir
            .get_or_try_init(|| async {
                let dir = tempfile::Builder::new()
                    .prefix(&tasks::cache_dir_prefix(std::process::id()))
                    .tempdir()?;
                debug!(path = %dir.path().display(), "created local cache directory");
                Ok::<_, std::io::Error>(dir)
            })
            .await?;
        Ok(dir.path())
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for LocalBackend {
    async fn put(
        &self,
        key: &str,
        namespace: Option<&Namespace>,
        data: Option<Bytes>,
        metadata: Option<&serde_json::Value>,
        expiration: i64,
        is_json: bool,
    ) -> Result<()> {
        let id = self.sanitizer.sanitize(key, namespace);
        let entry = EntryMetadata {
            key: key.to_string(),
            namespace: namespace.cloned(),
            metadata: metadata.cloned(),
            expiration,
            is_json,
        };
        let frame = encode_frame(&entry, data.as_deref())?;

        let root = self.cache_root().await?;
        let dir = id.namespace_dir(root);
        fs::create_dir_all(&dir).await?;
        fs::write(id.file_path(root), &frame).await?;
        Ok(())
    }

    async fn get(&self, key: &str, namespace: Option<&Namespace>) -> Result<Option<RawEntry>> {
        let id = self.sanitizer.sanitize(key, namespace);
        let root = self.cache_root().await?;

        match fs::read(id.file_path(root)).await {
            Ok(raw) => {
                let (metadata, data) = decode_frame(&raw)?;
                Ok(Some(RawEntry { metadata, data }))
            }
            // Only a missing file collapses to not-found; other I/O errors
            // propagate.
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, key: &str, namespace: Option<&Namespace>) -> Result<()> {
        let id = self.sanitizer.sanitize(key, namespace);
        let root = self.cache_root().await?;

        match fs::remove_file(id.file_path(root)).await {
            Ok(()) => Ok(()),
            // Idempotent delete.
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
