//! SSR Cache - a persistent key/value cache for server-side rendering
//!
//! Sits between a rendering process and either the local filesystem or an
//! S3-compatible object store. Entries are namespaced, carry caller
//! metadata and an expiration, and every operation reports timing and
//! hit/miss metrics through an injected sink.

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod metrics;
pub mod models;
mod tasks;

pub use cache::{PersistentCache, DELTA_THRESHOLD, ONE_YEAR_MS};
pub use config::CacheOptions;
pub use error::{CacheError, Result};
pub use metrics::{MetricUnit, MetricsSink};
pub use models::{CacheResult, CacheValue, Namespace, PutRequest};
