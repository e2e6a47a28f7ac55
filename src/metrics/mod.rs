// Voice & Search API metrics for monitoring and observability
//
// This module contains the metrics for the API.
// It provides a pluggable exporter with Prometheus and no-op backends.

pub mod error;
pub mod metrics;
pub mod null;
pub mod prometheus;

pub use self::error::MetricsError;
pub use self::metrics::{
    create_metrics_exporter, create_null_exporter, create_prometheus_exporter, Metrics,
    MetricsExporter,
};
