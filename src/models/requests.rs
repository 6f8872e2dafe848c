//! Request shape for the PUT operation
//!
//! Mirrors the caller contract: key, optional namespace, optional payload,
//! optional caller metadata and an optional expiration.

use serde_json::Value;

use crate::models::{CacheValue, Namespace};

/// Arguments for [`PersistentCache::put`](crate::PersistentCache::put).
///
/// # Expiration
/// The expiration is an epoch timestamp in milliseconds. A value below the
/// delta threshold (midnight on January 1st, 1980) is interpreted as a delta
/// in milliseconds added to the current time; this allows for deltas up to
/// ten years. When no expiration is given, the entry expires one year after
/// it is stored.
#[derive(Debug, Clone)]
pub struct PutRequest {
    /// The cache key; the last `/`-separated segment must be a hash
    /// pre-computed by the caller
    pub key: String,
    /// Optional namespace partitioning the key space
    pub namespace: Option<Namespace>,
    /// Optional payload
    pub data: Option<CacheValue>,
    /// Optional JSON-serializable caller metadata, stored alongside the data
    pub metadata: Option<Value>,
    /// Optional expiration (absolute epoch ms, or a delta below the
    /// threshold)
    pub expiration: Option<i64>,
}

impl PutRequest {
    /// Creates a request storing nothing but the key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            namespace: None,
            data: None,
            metadata: None,
            expiration: None,
        }
    }

    /// Sets the namespace.
    pub fn namespace(mut self, namespace: impl Into<Namespace>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the payload.
    pub fn data(mut self, data: impl Into<CacheValue>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets the caller metadata.
    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Sets the expiration (absolute epoch ms, or a delta below the
    /// threshold).
    pub fn expiration(mut self, expiration: i64) -> Self {
        self.expiration = Some(expiration);
        self
    }
}
