//! Cache Façade
//!
//! The public `get`/`put`/`delete` surface. The façade resolves the backend
//! once at construction, enforces expiration policy, serializes non-binary
//! payloads, and wraps every operation with timing and hit/miss metrics.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use object_store::ObjectStore;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::backend::{self, CacheBackend, RawEntry, RemoteBackend};
use crate::cache::{entry::now_ms, DELTA_THRESHOLD, ONE_YEAR_MS};
use crate::config::CacheOptions;
use crate::error::{CacheError, Result};
use crate::metrics::{
    MetricUnit, MetricsSink, METRIC_HIT_OCCURRED, METRIC_RETRIEVAL_TIME_HIT,
    METRIC_RETRIEVAL_TIME_MISS, METRIC_STORAGE_TIME,
};
use crate::models::{CacheResult, CacheValue, Namespace, PutRequest};

// == Persistent Cache ==
/// A persistent key/value cache backed by local disk or a remote object
/// store.
///
/// The render server constructs one instance and shares it; project code
/// never constructs this directly. Entries under the same key but in
/// different namespaces are distinct. Reads of expired entries return a
/// miss and schedule the stale entry's deletion in the background.
pub struct PersistentCache {
    /// `None` marks a non-functional instance: gets always miss, puts and
    /// deletes do nothing.
    backend: Option<Arc<dyn CacheBackend>>,
    send_metric: Arc<dyn MetricsSink>,
    // Single-slot chain for lazy expiry deletes, instance-wide: each new
    // delete runs after the currently pending one resolves, so overlapping
    // deletes execute in issue order. A concurrent put may still race the
    // delete for the same identifier; that narrow race is accepted.
    pending_delete: Mutex<Option<JoinHandle<()>>>,
}

impl PersistentCache {
    /// Creates a cache from construction options.
    ///
    /// Fails when no metrics sink is configured. A remote configuration
    /// without a bucket yields a non-functional instance rather than an
    /// error.
    pub fn new(options: CacheOptions) -> Result<Self> {
        let send_metric = options
            .send_metric
            .clone()
            .ok_or_else(|| CacheError::Config("a send_metric sink must be provided".to_string()))?;
        let backend = backend::resolve(&options)?;
        Ok(Self {
            backend,
            send_metric,
            pending_delete: Mutex::new(None),
        })
    }

    /// Creates a remote-backed cache over an injected object store client,
    /// for tests and for callers that construct their own client.
    pub fn with_object_store(
        store: Arc<dyn ObjectStore>,
        prefix: Option<String>,
        send_metric: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            backend: Some(Arc::new(RemoteBackend::new(store, prefix))),
            send_metric,
            pending_delete: Mutex::new(None),
        }
    }

    // == Get ==
    /// Looks up an entry.
    ///
    /// Always resolves to a [`CacheResult`]; `found == false` covers
    /// "never existed", "expired" and "non-functional instance" alike, so
    /// callers can destructure uniformly. A hit carries the stored data,
    /// caller metadata and absolute expiration. Each call returns its own
    /// copy of the stored value.
    pub async fn get(&self, key: &str, namespace: Option<&Namespace>) -> Result<CacheResult> {
        let start = Instant::now();
        let result = self.internal_get(key, namespace).await?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let timing_metric = if result.found {
            METRIC_RETRIEVAL_TIME_HIT
        } else {
            METRIC_RETRIEVAL_TIME_MISS
        };
        self.send_metric
            .send(timing_metric, elapsed_ms, MetricUnit::Milliseconds, None);
        self.send_metric.send(
            METRIC_HIT_OCCURRED,
            if result.found { 1.0 } else { 0.0 },
            MetricUnit::None,
            None,
        );
        Ok(result)
    }

    async fn internal_get(&self, key: &str, namespace: Option<&Namespace>) -> Result<CacheResult> {
        let Some(backend) = &self.backend else {
            return Ok(CacheResult::not_found(key, namespace));
        };

        let Some(raw) = backend.get(key, namespace).await? else {
            return Ok(CacheResult::not_found(key, namespace));
        };

        if raw.metadata.expiration < now_ms() {
            info!(key = %raw.metadata.key, "cache entry expired, deleting cache object");
            self.schedule_lazy_delete(key, namespace).await;
            return Ok(CacheResult::not_found(key, namespace));
        }

        Self::from_raw(raw)
    }

    /// Shapes a live raw record into a hit, decoding JSON payloads.
    fn from_raw(raw: RawEntry) -> Result<CacheResult> {
        let RawEntry { metadata, data } = raw;
        let data = match data {
            None => None,
            Some(bytes) if metadata.is_json => {
                Some(CacheValue::Json(serde_json::from_slice(&bytes)?))
            }
            Some(bytes) => Some(CacheValue::Bytes(bytes)),
        };
        Ok(CacheResult {
            key: metadata.key,
            namespace: metadata.namespace,
            found: true,
            data,
            metadata: metadata.metadata,
            expiration: Some(metadata.expiration),
        })
    }

    // == Put ==
    /// Stores an entry, replacing any prior entry under the same sanitized
    /// identifier.
    ///
    /// Byte payloads are stored as-is; any other payload is JSON-encoded
    /// and flagged so `get` can decode it. On a non-functional instance
    /// this resolves immediately without I/O.
    pub async fn put(&self, request: PutRequest) -> Result<()> {
        let start = Instant::now();
        self.internal_put(request).await?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.send_metric
            .send(METRIC_STORAGE_TIME, elapsed_ms, MetricUnit::Milliseconds, None);
        Ok(())
    }

    async fn internal_put(&self, request: PutRequest) -> Result<()> {
        let Some(backend) = &self.backend else {
            return Ok(());
        };

        let (data, is_json): (Option<Bytes>, bool) = match request.data {
            None => (None, false),
            Some(CacheValue::Bytes(bytes)) => (Some(bytes), false),
            Some(CacheValue::Json(value)) => {
                (Some(Bytes::from(serde_json::to_vec(&value)?)), true)
            }
        };

        let expiration = resolve_expiration(request.expiration, now_ms());

        backend
            .put(
                &request.key,
                request.namespace.as_ref(),
                data,
                request.metadata.as_ref(),
                expiration,
                is_json,
            )
            .await
    }

    // == Delete ==
    /// Removes a single entry. Deletion is unconditional: no expiration
    /// check, and deleting a missing entry succeeds.
    pub async fn delete(&self, key: &str, namespace: Option<&Namespace>) -> Result<()> {
        let Some(backend) = &self.backend else {
            return Ok(());
        };
        backend.delete(key, namespace).await
    }

    // == Lazy Expiry Deletes ==
    /// Fire-and-forget deletion of an expired entry, chained after the
    /// currently pending lazy delete so overlapping deletes on this
    /// instance run in issue order.
    async fn schedule_lazy_delete(&self, key: &str, namespace: Option<&Namespace>) {
        let Some(backend) = &self.backend else {
            return;
        };
        let backend = Arc::clone(backend);
        let key = key.to_string();
        let namespace = namespace.cloned();

        let mut slot = self.pending_delete.lock().await;
        let prior = slot.take();
        *slot = Some(tokio::spawn(async move {
            if let Some(prior) = prior {
                let _ = prior.await;
            }
            if let Err(err) = backend.delete(&key, namespace.as_ref()).await {
                warn!(%key, error = %err, "lazy delete of expired cache entry failed");
            }
        }));
    }

    /// Waits for the pending lazy delete chain to drain. Provided for
    /// testing purposes.
    pub async fn flush_pending_deletes(&self) {
        let handle = self.pending_delete.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

// == Expiration Resolution ==
/// Resolves a caller-supplied expiration to an absolute epoch-ms
/// timestamp.
///
/// No expiration defaults to one year from now. A value below
/// [`DELTA_THRESHOLD`] is a delta in milliseconds added to the current
/// time (negative deltas land in the past); at or above the threshold it
/// is taken as an absolute timestamp.
pub(crate) fn resolve_expiration(requested: Option<i64>, now: i64) -> i64 {
    let working = requested.unwrap_or(ONE_YEAR_MS);
    if working < DELTA_THRESHOLD {
        now + working
    } else {
        working
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_default_expiration_is_one_year_out() {
        assert_eq!(resolve_expiration(None, NOW), NOW + ONE_YEAR_MS);
    }

    #[test]
    fn test_below_threshold_is_a_delta() {
        assert_eq!(resolve_expiration(Some(5_000), NOW), NOW + 5_000);
        assert_eq!(resolve_expiration(Some(-1_000), NOW), NOW - 1_000);
    }

    #[test]
    fn test_at_threshold_is_absolute() {
        assert_eq!(resolve_expiration(Some(DELTA_THRESHOLD), NOW), DELTA_THRESHOLD);
        assert_eq!(resolve_expiration(Some(NOW + 60_000), NOW), NOW + 60_000);
    }

    #[test]
    fn test_just_below_threshold_is_a_delta() {
        let value = DELTA_THRESHOLD - 1;
        assert_eq!(resolve_expiration(Some(value), NOW), NOW + value);
    }
}
