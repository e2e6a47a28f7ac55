//! Prometheus metrics exporter implementation
//!
//! Collects counters and histograms in a private registry and exports them
//! in the Prometheus text exposition format.

use crate::metrics::error::MetricsError;
use crate::metrics::metrics::MetricsExporter;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::debug;
use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};

/// Upload sizes, 1 KiB to 64 MiB
const SIZE_BUCKETS: &[f64] = &[
    1024.0, 16384.0, 65536.0, 262144.0, 1048576.0, 4194304.0, 16777216.0, 67108864.0,
];

/// Durations in seconds, up to twice the default outbound timeout
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
];

/// A registered series; one name maps to exactly one kind
#[derive(Clone)]
enum Series {
    Counter(CounterVec),
    Histogram(HistogramVec),
}

impl Series {
    fn kind(&self) -> &'static str {
        match self {
            Series::Counter(_) => "counter",
            Series::Histogram(_) => "histogram",
        }
    }
}

/// Prometheus implementation of MetricsExporter
pub struct PrometheusExporter {
    registry: Registry,
    series: DashMap<String, Series>,
    /// Prefix joined to every metric name with `_`
    namespace: Option<String>,
}

impl Default for PrometheusExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl PrometheusExporter {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            series: DashMap::new(),
            namespace: None,
        }
    }

    pub fn with_namespace<S: Into<String>>(namespace: S) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Self::new()
        }
    }

    fn full_name(&self, name: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{}_{}", ns, name),
            None => name.to_string(),
        }
    }

    fn buckets_for(name: &str) -> Vec<f64> {
        if name.ends_with("_bytes") || name.contains("size") {
            SIZE_BUCKETS.to_vec()
        } else {
            DURATION_BUCKETS.to_vec()
        }
    }

    fn build(
        &self,
        name: &str,
        full_name: &str,
        kind: &'static str,
        label_names: &[&str],
    ) -> Result<Series, MetricsError> {
        let help = format!("{} ({})", name.replace('_', " "), kind);
        let created = if kind == "counter" {
            CounterVec::new(Opts::new(full_name, help), label_names).map(Series::Counter)
        } else {
            let opts = HistogramOpts::new(full_name, help).buckets(Self::buckets_for(name));
            HistogramVec::new(opts, label_names).map(Series::Histogram)
        };
        let series = created.map_err(|e| MetricsError::registration_failed(name, e))?;

        let collector: Box<dyn prometheus::core::Collector> = match &series {
            Series::Counter(c) => Box::new(c.clone()),
            Series::Histogram(h) => Box::new(h.clone()),
        };
        self.registry
            .register(collector)
            .map_err(|e| MetricsError::registration_failed(name, e))?;
        Ok(series)
    }

    /// Looks up the series, registering it on first use
    fn series(
        &self,
        name: &str,
        kind: &'static str,
        label_names: &[&str],
    ) -> Result<Series, MetricsError> {
        let full_name = self.full_name(name);
        let series = match self.series.entry(full_name.clone()) {
            Entry::Occupied(e) => e.get().clone(),
            Entry::Vacant(e) => {
                let series = self.build(name, &full_name, kind, label_names)?;
                e.insert(series.clone());
                series
            }
        };

        if series.kind() != kind {
            return Err(MetricsError::registration_failed(
                name,
                format!("already registered as a {}", series.kind()),
            ));
        }
        Ok(series)
    }
}

fn split_labels<'a>(labels: &[(&'a str, &'a str)]) -> (Vec<&'a str>, Vec<&'a str>) {
    labels.iter().copied().unzip()
}

#[async_trait]
impl MetricsExporter for PrometheusExporter {
    async fn increment(&self, name: &str, labels: &[(&str, &str)]) -> Result<(), MetricsError> {
        let (keys, values) = split_labels(labels);
        if let Series::Counter(counter) = self.series(name, "counter", &keys)? {
            counter
                .get_metric_with_label_values(&values)
                .map_err(|e| MetricsError::registration_failed(name, e))?
                .inc();
        }
        debug!("{} {:?} +1", name, labels);
        Ok(())
    }

    async fn observe_histogram(
        &self,
        name: &str,
        value: f64,
        labels: &[(&str, &str)],
    ) -> Result<(), MetricsError> {
        let (keys, values) = split_labels(labels);
        if let Series::Histogram(histogram) = self.series(name, "histogram", &keys)? {
            histogram
                .get_metric_with_label_values(&values)
                .map_err(|e| MetricsError::registration_failed(name, e))?
                .observe(value);
        }
        debug!("{} {:?} observed {}", name, labels, value);
        Ok(())
    }

    async fn export(&self) -> Result<Vec<u8>, MetricsError> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| MetricsError::ExportFailed(e.to_string()))?;
        Ok(buffer)
    }
}
