//! Configuration Module
//!
//! Construction options for the persistent cache, with optional environment
//! variable overrides for deployment configuration.

use std::env;
use std::fmt;
use std::sync::Arc;

use crate::metrics::MetricsSink;

/// Construction options for [`PersistentCache`](crate::PersistentCache).
///
/// A deployed render server uses the remote (S3) cache; the local
/// development server uses the local disk cache. A remote configuration
/// without a bucket produces a non-functional instance: every `get` misses
/// and `put`/`delete` resolve without performing I/O.
///
/// The metrics sink is required; constructing a cache without one fails.
#[derive(Clone, Default)]
pub struct CacheOptions {
    /// true for the local disk cache, false for the remote object store
    pub use_local_cache: bool,
    /// Remote bucket name; absence makes the instance non-functional
    pub bucket: Option<String>,
    /// Leading path segment applied to every remote key
    pub prefix: Option<String>,
    /// Remote endpoint override (allows for testing)
    pub endpoint: Option<String>,
    /// Access key override, for testing
    pub access_key_id: Option<String>,
    /// Secret key override, for testing
    pub secret_access_key: Option<String>,
    /// Required callback for performance metrics
    pub send_metric: Option<Arc<dyn MetricsSink>>,
}

impl CacheOptions {
    /// Options for a local disk cache.
    pub fn local(send_metric: Arc<dyn MetricsSink>) -> Self {
        Self {
            use_local_cache: true,
            send_metric: Some(send_metric),
            ..Self::default()
        }
    }

    /// Options for a remote object-store cache.
    pub fn remote(bucket: impl Into<String>, send_metric: Arc<dyn MetricsSink>) -> Self {
        Self {
            use_local_cache: false,
            bucket: Some(bucket.into()),
            send_metric: Some(send_metric),
            ..Self::default()
        }
    }

    /// Applies environment variable overrides to these options.
    ///
    /// # Environment Variables
    /// - `CACHE_USE_LOCAL` - "1"/"true" selects the local backend
    /// - `CACHE_BUCKET` - remote bucket name
    /// - `CACHE_PREFIX` - remote key prefix
    /// - `CACHE_ENDPOINT` - remote endpoint override
    pub fn from_env(mut self) -> Self {
        if let Ok(v) = env::var("CACHE_USE_LOCAL") {
            self.use_local_cache = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Ok(v) = env::var("CACHE_BUCKET") {
            self.bucket = Some(v);
        }
        if let Ok(v) = env::var("CACHE_PREFIX") {
            self.prefix = Some(v);
        }
        if let Ok(v) = env::var("CACHE_ENDPOINT") {
            self.endpoint = Some(v);
        }
        self
    }

    /// Sets the remote key prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets endpoint and credential overrides, primarily for test injection.
    pub fn endpoint_override(
        mut self,
        endpoint: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.endpoint = Some(endpoint.into());
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }
}

impl fmt::Debug for CacheOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheOptions")
            .field("use_local_cache", &self.use_local_cache)
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("endpoint", &self.endpoint)
            .field("send_metric", &self.send_metric.is_some())
            .finish()
    }
}
