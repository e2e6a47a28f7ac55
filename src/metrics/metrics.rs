//! Metrics facade for the Voice & Search API
//!
//! Handlers record through [`Metrics`], which validates input and forwards to a
//! pluggable [`MetricsExporter`]. Recording never fails a request: the convenience
//! methods log exporter errors and carry on.
//!
//! ```rust,no_run
//! use voice_search_api::metrics::{create_prometheus_exporter, Metrics};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let metrics = Metrics::new(create_prometheus_exporter(None));
//!     metrics.record_http_request("/books", "GET", "200", 0.042).await;
//!
//!     let exported = metrics.export().await?;
//!     println!("{}", String::from_utf8_lossy(&exported));
//!     Ok(())
//! }
//! ```

use crate::metrics::error::{validation, MetricsError};
use crate::metrics::null::NullExporter;
use crate::metrics::prometheus::PrometheusExporter;
use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;

/// Metrics exporter trait for pluggable monitoring systems
#[async_trait]
pub trait MetricsExporter: Send + Sync {
    /// Increment a counter metric by 1
    async fn increment(&self, name: &str, labels: &[(&str, &str)]) -> Result<(), MetricsError>;

    /// Observe a value in a histogram metric
    async fn observe_histogram(
        &self,
        name: &str,
        value: f64,
        labels: &[(&str, &str)],
    ) -> Result<(), MetricsError>;

    /// Export metrics in the format expected by the monitoring system
    async fn export(&self) -> Result<Vec<u8>, MetricsError>;
}

/// Metrics facade for the application
#[derive(Clone)]
pub struct Metrics {
    exporter: Arc<dyn MetricsExporter>,
}

impl Metrics {
    pub fn new(exporter: Arc<dyn MetricsExporter>) -> Self {
        Self { exporter }
    }

    /// Increment a counter after validating its name and labels
    pub async fn increment(&self, name: &str, labels: &[(&str, &str)]) -> Result<(), MetricsError> {
        validation::check_name(name)?;
        validation::check_labels(labels)?;
        self.exporter.increment(name, labels).await
    }

    /// Observe a histogram value after validating name, labels and value
    pub async fn observe_histogram(
        &self,
        name: &str,
        value: f64,
        labels: &[(&str, &str)],
    ) -> Result<(), MetricsError> {
        validation::check_name(name)?;
        validation::check_labels(labels)?;
        validation::check_value(value)?;
        self.exporter.observe_histogram(name, value, labels).await
    }

    pub async fn export(&self) -> Result<Vec<u8>, MetricsError> {
        self.exporter.export().await
    }

    /// Record an HTTP request with its duration in seconds
    pub async fn record_http_request(
        &self,
        endpoint: &str,
        method: &str,
        status: &str,
        duration: f64,
    ) {
        let labels = [("endpoint", endpoint), ("method", method), ("status", status)];
        self.observe_histogram_internal("http_request_duration_seconds", duration, &labels)
            .await;
        self.increment_internal("http_requests_total", &labels).await;
    }

    /// Record the outcome of one outbound call ("success", "status", "timeout", ...)
    pub async fn record_upstream_call(&self, provider: &str, outcome: &str) {
        self.increment_internal(
            "upstream_requests_total",
            &[("provider", provider), ("outcome", outcome)],
        )
        .await;
    }

    /// Record the size of an accepted upload
    pub async fn record_upload_size(&self, size_bytes: usize) {
        self.observe_histogram_internal("upload_size_bytes", size_bytes as f64, &[])
            .await;
    }

    async fn increment_internal(&self, name: &str, labels: &[(&str, &str)]) {
        if let Err(e) = self.increment(name, labels).await {
            warn!("Failed to increment metric '{}': {}", name, e);
        }
    }

    async fn observe_histogram_internal(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        if let Err(e) = self.observe_histogram(name, value, labels).await {
            warn!("Failed to observe histogram '{}': {}", name, e);
        }
    }
}

/// Factory function to create metrics exporter based on configuration
pub fn create_metrics_exporter(
    exporter_type: &str,
    namespace: Option<&str>,
) -> Arc<dyn MetricsExporter> {
    match exporter_type.to_lowercase().as_str() {
        "prometheus" => create_prometheus_exporter(namespace),
        "none" | "null" | "disabled" => {
            debug!("Metrics disabled, using null exporter");
            create_null_exporter()
        }
        _ => {
            warn!(
                "Unknown metrics exporter type '{}', using null exporter",
                exporter_type
            );
            create_null_exporter()
        }
    }
}

/// Factory function to create a Prometheus metrics exporter
pub fn create_prometheus_exporter(namespace: Option<&str>) -> Arc<dyn MetricsExporter> {
    debug!("Creating Prometheus metrics exporter (namespace: {:?})", namespace);
    // An invalid prefix would make every series fail to register
    match namespace.filter(|ns| match validation::check_name(ns) {
        Ok(()) => true,
        Err(e) => {
            warn!("Ignoring metrics namespace: {}", e);
            false
        }
    }) {
        Some(ns) => Arc::new(PrometheusExporter::with_namespace(ns)),
        None => Arc::new(PrometheusExporter::new()),
    }
}

/// Factory function to create a null (no-op) metrics exporter
pub fn create_null_exporter() -> Arc<dyn MetricsExporter> {
    Arc::new(NullExporter)
}
