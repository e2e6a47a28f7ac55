// Voice & Search API Library
//
// This crate provides an HTTP API that forwards speech-to-text, video search and
// book search requests to external services and normalizes their responses.

pub mod config;
pub mod config_loader;
pub mod error;
pub mod file_utils;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod providers;

// Re-export common types for easier access
pub use config::{HandlerConfig, MetricsConfig, UpstreamConfig};
pub use error::HandlerError;
pub use handlers::{configure, Cors};
pub use metrics::Metrics;
pub use models::{BookSummary, ErrorResponse, Transcript, VoiceProcessResponse};
pub use providers::{
    BookSearchProvider, HttpBookSearchProvider, HttpTranscriptionProvider,
    HttpVideoSearchProvider, ProviderError, TranscriptionProvider, VideoSearchProvider,
};
