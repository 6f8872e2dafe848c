//! Backend Module
//!
//! Storage backends behind the cache façade. The backend family is chosen
//! once at construction and dispatched through the [`CacheBackend`]
//! capability trait; call sites never branch on which family is active.
//!
//! - [`LocalBackend`]: framed files under a per-process temp directory
//! - [`RemoteBackend`]: paired data/metadata objects in an object store

mod local;
mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::warn;

pub use local::LocalBackend;
pub use remote::RemoteBackend;

use crate::cache::entry::EntryMetadata;
use crate::config::CacheOptions;
use crate::error::Result;
use crate::models::Namespace;

// == Raw Entry ==
/// A stored entry as a backend returns it, before the façade applies
/// expiration policy and payload decoding.
#[derive(Debug, Clone)]
pub struct RawEntry {
    /// The stored entry metadata
    pub metadata: EntryMetadata,
    /// The stored payload bytes, if any
    pub data: Option<Bytes>,
}

// == Cache Backend Trait ==
/// Common capability interface over the two storage backends.
///
/// `get` returning `Ok(None)` means not-found; backends reserve `Err` for
/// failures that should propagate (the remote backend's reads are
/// defensive and never raise).
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Stores an entry, replacing any prior entry under the same
    /// sanitized identifier.
    #[allow(clippy::too_many_arguments)]
    async fn put(
        &self,
        key: &str,
        namespace: Option<&Namespace>,
        data: Option<Bytes>,
        metadata: Option<&serde_json::Value>,
        expiration: i64,
        is_json: bool,
    ) -> Result<()>;

    /// Reads an entry; `None` means not-found.
    async fn get(&self, key: &str, namespace: Option<&Namespace>) -> Result<Option<RawEntry>>;

    /// Removes an entry; deleting a missing entry is a success.
    async fn delete(&self, key: &str, namespace: Option<&Namespace>) -> Result<()>;
}

// == Backend Resolution ==
/// Resolves the configured backend.
///
/// Returns `None` for a remote configuration without a bucket: the cache
/// instance is then non-functional (every `get` misses, `put`/`delete` are
/// no-ops), which is deliberate rather than an error.
pub(crate) fn resolve(options: &CacheOptions) -> Result<Option<Arc<dyn CacheBackend>>> {
    if options.use_local_cache {
        return Ok(Some(Arc::new(LocalBackend::new())));
    }
    match &options.bucket {
        Some(_) => Ok(Some(Arc::new(RemoteBackend::from_options(options)?))),
        None => {
            warn!("no bucket configured; cache instance will be non-functional");
            Ok(None)
        }
    }
}
