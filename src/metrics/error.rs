//! Error types for the metrics system
//!
//! Metric failures are reported through these types and logged by the facade;
//! they never reach an HTTP client.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("Invalid metric name '{0}'")]
    InvalidName(String),

    #[error("Invalid label '{key}': {reason}")]
    InvalidLabel { key: String, reason: &'static str },

    /// Observations must be finite and non-negative
    #[error("Invalid observation {0}")]
    InvalidValue(f64),

    /// The series exists with another type, or the registry refused it
    #[error("Failed to register metric '{name}': {reason}")]
    RegistrationFailed { name: String, reason: String },

    #[error("Failed to export metrics: {0}")]
    ExportFailed(String),
}

impl MetricsError {
    pub fn registration_failed(name: &str, reason: impl ToString) -> Self {
        Self::RegistrationFailed {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    fn label(key: &str, reason: &'static str) -> Self {
        Self::InvalidLabel {
            key: key.to_string(),
            reason,
        }
    }
}

/// Input checks applied by the [`Metrics`](super::Metrics) facade before any backend sees a sample
pub mod validation {
    use super::MetricsError;

    const MAX_NAME_LENGTH: usize = 128;
    const MAX_LABEL_VALUE_LENGTH: usize = 256;
    const MAX_LABELS: usize = 16;

    /// Prometheus identifier: `[a-zA-Z_][a-zA-Z0-9_]*`, plus `:` for metric names
    fn is_identifier(s: &str, allow_colon: bool) -> bool {
        let mut chars = s.chars();
        let head_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || (allow_colon && c == ':'))
    }

    pub fn check_name(name: &str) -> Result<(), MetricsError> {
        if name.len() > MAX_NAME_LENGTH || !is_identifier(name, true) {
            return Err(MetricsError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    /// Keys must be unique identifiers outside the reserved `__` namespace;
    /// values must be short and free of control characters.
    pub fn check_labels(labels: &[(&str, &str)]) -> Result<(), MetricsError> {
        if labels.len() > MAX_LABELS {
            return Err(MetricsError::label("", "too many labels"));
        }

        for (i, (key, value)) in labels.iter().enumerate() {
            if !is_identifier(key, false) {
                return Err(MetricsError::label(key, "not an identifier"));
            }
            if key.starts_with("__") {
                return Err(MetricsError::label(key, "reserved key"));
            }
            if labels[..i].iter().any(|(seen, _)| seen == key) {
                return Err(MetricsError::label(key, "duplicate key"));
            }
            if value.len() > MAX_LABEL_VALUE_LENGTH {
                return Err(MetricsError::label(key, "value too long"));
            }
            if value.chars().any(char::is_control) {
                return Err(MetricsError::label(key, "control character in value"));
            }
        }

        Ok(())
    }

    pub fn check_value(value: f64) -> Result<(), MetricsError> {
        if !value.is_finite() || value < 0.0 {
            return Err(MetricsError::InvalidValue(value));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::MetricsError;

    #[test]
    fn test_names() {
        assert!(check_name("voice_api_http_requests_total").is_ok());
        assert!(check_name("_private").is_ok());
        assert!(check_name("upstream:latency_seconds").is_ok());

        for bad in ["", "9lives", "upload-size", "é"] {
            assert_eq!(check_name(bad), Err(MetricsError::InvalidName(bad.to_string())));
        }
        assert!(check_name(&"n".repeat(129)).is_err());
    }

    #[test]
    fn test_labels() {
        assert!(check_labels(&[("provider", "book_search"), ("outcome", "timeout")]).is_ok());
        assert!(check_labels(&[("status", "")]).is_ok());

        let err = check_labels(&[("provider", "a"), ("provider", "b")]).unwrap_err();
        assert_eq!(
            err,
            MetricsError::InvalidLabel {
                key: "provider".to_string(),
                reason: "duplicate key"
            }
        );
        assert!(check_labels(&[("__name__", "x")]).is_err());
        assert!(check_labels(&[("end-point", "/")]).is_err());
        assert!(check_labels(&[("endpoint", "tab\there")]).is_err());
        assert!(check_labels(&[("endpoint", &"/".repeat(257))]).is_err());
    }

    #[test]
    fn test_values() {
        assert!(check_value(0.0).is_ok());
        assert!(check_value(52_428_800.0).is_ok());

        assert!(check_value(f64::NAN).is_err());
        assert!(check_value(f64::NEG_INFINITY).is_err());
        assert!(check_value(-0.5).is_err());
    }
}
