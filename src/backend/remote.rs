//! Remote Backend
//!
//! Stores each entry as two paired objects in an S3-compatible object
//! store: `<key>.data` holds the raw payload and `<key>.metadata` holds
//! pretty-printed JSON describing the entry. Object stores restrict
//! per-object metadata severely (and it cannot be updated in place), which
//! is why the metadata lives in its own object.
//!
//! An entry exists only when both objects exist; either alone is treated as
//! not-found. Reads are defensive and never raise; writes are strict and do
//! not compensate a failed partner, so a half-written pair may remain — the
//! both-objects rule keeps such orphans invisible.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::path::Path;
use object_store::{Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::{CacheBackend, RawEntry};
use crate::cache::entry::EntryMetadata;
use crate::config::CacheOptions;
use crate::error::{CacheError, Result};
use crate::keys::Sanitizer;
use crate::models::Namespace;

// == Object Metadata ==
/// The body of the `.metadata` object. Field names match the stored JSON.
#[derive(Debug, Serialize, Deserialize)]
struct ObjectMetadata {
    #[serde(rename = "isJSON")]
    is_json: bool,
    expiration: i64,
    key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace: Option<Namespace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<serde_json::Value>,
    #[serde(rename = "bodyIsEmpty")]
    body_is_empty: bool,
}

impl From<ObjectMetadata> for EntryMetadata {
    fn from(object: ObjectMetadata) -> Self {
        EntryMetadata {
            key: object.key,
            namespace: object.namespace,
            metadata: object.metadata,
            expiration: object.expiration,
            is_json: object.is_json,
        }
    }
}

// == Remote Backend ==
/// Object-store-backed cache storage over paired data/metadata objects.
pub struct RemoteBackend {
    store: Arc<dyn ObjectStore>,
    sanitizer: Sanitizer,
    // CACHE_LOGGING raises per-call logging to info level; behavior never
    // changes.
    verbose: bool,
}

impl RemoteBackend {
    /// Creates a backend over an injected object store client.
    pub fn new(store: Arc<dyn ObjectStore>, prefix: Option<String>) -> Self {
        Self {
            store,
            sanitizer: Sanitizer::remote(prefix),
            verbose: std::env::var("CACHE_LOGGING").is_ok(),
        }
    }

    /// Builds an S3 client from the options and wraps it.
    ///
    /// Endpoint and credential overrides exist primarily for test
    /// injection; production deployments configure the client from the
    /// environment.
    pub fn from_options(options: &CacheOptions) -> Result<Self> {
        let bucket = options
            .bucket
            .as_ref()
            .ok_or_else(|| CacheError::Config("remote cache requires a bucket".to_string()))?;

        let mut builder =
            object_store::aws::AmazonS3Builder::from_env().with_bucket_name(bucket);
        if let Some(endpoint) = &options.endpoint {
            builder = builder.with_endpoint(endpoint).with_allow_http(true);
        }
        if let (Some(access_key_id), Some(secret_access_key)) =
            (&options.access_key_id, &options.secret_access_key)
        {
            builder = builder
                .with_access_key_id(access_key_id)
                .with_secret_access_key(secret_access_key);
        }

        let store = builder.build()?;
        Ok(Self::new(Arc::new(store), options.prefix.clone()))
    }

    fn log_call(&self, op: &str, location: &Path) {
        if self.verbose {
            info!(op, location = %location, "object store call");
        } else {
            debug!(op, location = %location, "object store call");
        }
    }

    /// Object-level expiry hint carried as custom object metadata.
    fn expiry_attributes(expiration: i64) -> Attributes {
        let expires = chrono::DateTime::from_timestamp_millis(expiration)
            .map(|ts| ts.to_rfc3339())
            .unwrap_or_else(|| expiration.to_string());
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::Metadata("expires".into()), expires.into());
        attributes
    }

    /// A read that never raises: a missing object resolves to `None`, and
    /// any other transport error is logged and also resolves to `None`.
    async fn safe_get(&self, location: &Path) -> Option<Bytes> {
        self.log_call("get", location);
        let result = match self.store.get(location).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => return None,
            Err(err) => {
                warn!(location = %location, error = %err, "unexpected error reading cache object");
                return None;
            }
        };
        match result.bytes().await {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                warn!(location = %location, error = %err, "unexpected error reading cache object body");
                None
            }
        }
    }
}

#[async_trait]
impl CacheBackend for RemoteBackend {
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
        let data_location = Path::from(id.remote_data_key);
        let metadata_location = Path::from(id.remote_metadata_key);

        let body_is_empty = data.is_none();
        let object_metadata = ObjectMetadata {
            is_json,
            expiration,
            key: key.to_string(),
            namespace: namespace.cloned(),
            metadata: metadata.cloned(),
            body_is_empty,
        };

        // The data object cannot have an absent body; an empty body stands
        // in and bodyIsEmpty records the difference. The metadata body is
        // pretty-printed to aid debugging.
        let data_body = data.unwrap_or_else(Bytes::new);
        let metadata_body = Bytes::from(serde_json::to_vec_pretty(&object_metadata)?);

        let put = |location: Path, body: Bytes| {
            let opts = PutOptions {
                attributes: Self::expiry_attributes(expiration),
                ..Default::default()
            };
            async move {
                self.store
                    .put_opts(&location, PutPayload::from_bytes(body), opts)
                    .await
            }
        };

        self.log_call("put", &data_location);
        self.log_call("put", &metadata_location);

        // Both halves are written concurrently and both must succeed. A
        // failed half is not compensated; the partner object may remain.
        futures::try_join!(
            put(data_location, data_body),
            put(metadata_location, metadata_body),
        )?;
        Ok(())
    }

    async fn get(&self, key: &str, namespace: Option<&Namespace>) -> Result<Option<RawEntry>> {
        let id = self.sanitizer.sanitize(key, namespace);
        let data_location = Path::from(id.remote_data_key);
        let metadata_location = Path::from(id.remote_metadata_key);

        let (data_body, metadata_body) = futures::join!(
            self.safe_get(&data_location),
            self.safe_get(&metadata_location),
        );

        // Both objects must exist for the entry to be present.
        let (Some(data_body), Some(metadata_body)) = (data_body, metadata_body) else {
            return Ok(None);
        };

        let object_metadata: ObjectMetadata = match serde_json::from_slice(&metadata_body) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(location = %metadata_location, error = %err, "unexpected error processing cache entry");
                return Ok(None);
            }
        };

        // A payload flagged as JSON that does not parse is treated like any
        // other malformed entry: logged and reported as a miss, never
        // raised.
        if object_metadata.is_json && !object_metadata.body_is_empty {
            if let Err(err) = serde_json::from_slice::<serde_json::Value>(&data_body) {
                warn!(location = %data_location, error = %err, "unexpected error processing cache entry");
                return Ok(None);
            }
        }

        let data = if object_metadata.body_is_empty {
            None
        } else {
            Some(data_body)
        };
        Ok(Some(RawEntry {
            metadata: object_metadata.into(),
            data,
        }))
    }

    async fn delete(&self, key: &str, namespace: Option<&Namespace>) -> Result<()> {
        let id = self.sanitizer.sanitize(key, namespace);
        let data_location = Path::from(id.remote_data_key);
        let metadata_location = Path::from(id.remote_metadata_key);

        self.log_call("delete", &data_location);
        self.log_call("delete", &metadata_location);

        let results = futures::join!(
            self.store.delete(&data_location),
            self.store.delete(&metadata_location),
        );

        // Missing objects are swallowed; anything else is logged but not
        // surfaced, so the caller cannot tell which half failed.
        for result in [results.0, results.1] {
            match result {
                Ok(()) | Err(object_store::Error::NotFound { .. }) => {}
                Err(err) => warn!(error = %err, "unexpected error deleting cache object"),
            }
        }
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use serde_json::json;

    fn memory_backend(prefix: Option<&str>) -> RemoteBackend {
        RemoteBackend::new(
            Arc::new(InMemory::new()),
            prefix.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_put_then_get_roundtrip() {
        let backend = memory_backend(None);
        let ns = Namespace::from("products");

        backend
            .put(
                "hash123",
                Some(&ns),
                Some(Bytes::from_static(b"abc")),
                Some(&json!({"status": 200})),
                i64::MAX,
                false,
            )
            .await
            .unwrap();

        let entry = backend.get("hash123", Some(&ns)).await.unwrap().unwrap();
        assert_eq!(entry.metadata.key, "hash123");
        assert_eq!(entry.metadata.namespace, Some(ns));
        assert_eq!(entry.metadata.metadata, Some(json!({"status": 200})));
        assert_eq!(entry.data.unwrap().as_ref(), b"abc");
    }

    #[tokio::test]
    async fn test_paired_objects_are_written() {
        let store = Arc::new(InMemory::new());
        let backend = RemoteBackend::new(store.clone(), None);

        backend
            .put("hash123", None, Some(Bytes::from_static(b"x")), None, 0, false)
            .await
            .unwrap();

        store.get(&Path::from("hash123.data")).await.unwrap();
        let metadata = store
            .get(&Path::from("hash123.metadata"))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&metadata).unwrap();
        assert_eq!(json["key"], "hash123");
        assert_eq!(json["bodyIsEmpty"], false);
        assert_eq!(json["isJSON"], false);
    }

    #[tokio::test]
    async fn test_missing_entry_is_none() {
        let backend = memory_backend(None);
        assert!(backend.get("absent", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_orphaned_metadata_object_is_a_miss() {
        let store = Arc::new(InMemory::new());
        let backend = RemoteBackend::new(store.clone(), None);

        backend
            .put("hash123", None, Some(Bytes::from_static(b"x")), None, i64::MAX, false)
            .await
            .unwrap();

        // Delete the data object out-of-band; the metadata object alone
        // must not count as a present entry.
        store.delete(&Path::from("hash123.data")).await.unwrap();

        assert!(backend.get("hash123", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_flagged_payload_that_does_not_parse_is_a_miss() {
        let backend = memory_backend(None);

        // The writer does not validate, so a body flagged as JSON can hold
        // anything; the reader must degrade to a miss rather than raise.
        backend
            .put("hash123", None, Some(Bytes::from_static(b"not json")), None, i64::MAX, true)
            .await
            .unwrap();

        assert!(backend.get("hash123", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_body_roundtrip() {
        let backend = memory_backend(None);

        backend
            .put("hash123", None, None, Some(&json!({"k": 1})), i64::MAX, false)
            .await
            .unwrap();

        let entry = backend.get("hash123", None).await.unwrap().unwrap();
        assert!(entry.data.is_none());
        assert_eq!(entry.metadata.metadata, Some(json!({"k": 1})));
    }

    #[tokio::test]
    async fn test_delete_removes_both_objects() {
        let store = Arc::new(InMemory::new());
        let backend = RemoteBackend::new(store.clone(), None);

        backend
            .put("hash123", None, Some(Bytes::from_static(b"x")), None, i64::MAX, false)
            .await
            .unwrap();
        backend.delete("hash123", None).await.unwrap();

        assert!(store.get(&Path::from("hash123.data")).await.is_err());
        assert!(store.get(&Path::from("hash123.metadata")).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_missing_entry_succeeds() {
        let backend = memory_backend(None);
        backend.delete("never-stored", None).await.unwrap();
    }

    #[tokio::test]
    async fn test_prefix_applies_to_keys() {
        let store = Arc::new(InMemory::new());
        let backend = RemoteBackend::new(store.clone(), Some("ssr".to_string()));

        backend
            .put("hash123", None, Some(Bytes::from_static(b"x")), None, i64::MAX, false)
            .await
            .unwrap();

        store.get(&Path::from("ssr/hash123.data")).await.unwrap();
    }
}
