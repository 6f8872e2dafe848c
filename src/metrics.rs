//! Metrics Sink Module
//!
//! The cache never talks to a monitoring backend directly. Callers inject a
//! sink at construction time and every public operation reports through it:
//! retrieval latency split by hit/miss outcome, a hit/miss occurrence
//! counter, and storage latency.

use std::fmt;

// == Metric Names ==
/// Timing metric for a `get` that found a live entry.
pub const METRIC_RETRIEVAL_TIME_HIT: &str = "ApplicationCacheRetrievalTimeHit";

/// Timing metric for a `get` that missed (absent, expired or non-functional).
pub const METRIC_RETRIEVAL_TIME_MISS: &str = "ApplicationCacheRetrievalTimeMiss";

/// Occurrence counter reported after every `get` (1 for a hit, 0 for a miss).
pub const METRIC_HIT_OCCURRED: &str = "ApplicationCacheHitOccurred";

/// Timing metric for a `put`.
pub const METRIC_STORAGE_TIME: &str = "ApplicationCacheStorageTime";

// == Metric Unit ==
/// Unit attached to an emitted metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    /// Elapsed-time values
    Milliseconds,
    /// Dimensionless counters
    None,
}

impl fmt::Display for MetricUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricUnit::Milliseconds => write!(f, "Milliseconds"),
            MetricUnit::None => write!(f, "None"),
        }
    }
}

// == Metrics Sink ==
/// Callback seam for metric delivery.
///
/// The sink receives `(name, value, unit, dimensions)` once per reported
/// metric. Implementations must be cheap and non-blocking; the cache calls
/// them inline on the request path.
pub trait MetricsSink: Send + Sync {
    /// Deliver a single metric observation.
    fn send(
        &self,
        name: &str,
        value: f64,
        unit: MetricUnit,
        dimensions: Option<&serde_json::Value>,
    );
}

// Plain closures work as sinks, which keeps test wiring short.
impl<F> MetricsSink for F
where
    F: Fn(&str, f64, MetricUnit, Option<&serde_json::Value>) + Send + Sync,
{
    fn send(
        &self,
        name: &str,
        value: f64,
        unit: MetricUnit,
        dimensions: Option<&serde_json::Value>,
    ) {
        self(name, value, unit, dimensions)
    }
}
