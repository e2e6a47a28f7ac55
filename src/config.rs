// Voice & Search API configuration
//
// This module contains configuration structures and constants for the API.
// It centralizes all configuration parameters and provides defaults from environment variables.

use std::env;
use std::time::Duration;

/// Default values for configuration
pub mod defaults {
    // Directory where uploaded audio is stored while it is being transcribed
    pub const UPLOAD_DIR: &str = "uploads";

    // Prefix and extension of stored uploads
    pub const UPLOAD_PREFIX: &str = "voice";
    pub const UPLOAD_EXTENSION: &str = "webm";

    // Default max upload size (50MB)
    pub const MAX_FILE_SIZE: usize = 52_428_800;

    // Speech-to-text endpoint
    pub const TRANSCRIPTION_API_URL: &str = "https://api.worqhat.com/api/ai/speech-text";

    // Video search endpoint
    pub const VIDEO_SEARCH_API_URL: &str = "https://www.googleapis.com/youtube/v3/search";

    // Book search endpoint
    pub const BOOK_SEARCH_API_URL: &str = "https://www.googleapis.com/books/v1/volumes";

    // Number of results requested from the search services
    pub const SEARCH_MAX_RESULTS: u32 = 5;

    // Timeout in seconds for every outbound call
    pub const UPSTREAM_TIMEOUT_SECONDS: u64 = 30;
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| String::from(default))
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Configuration for the upload handling path
#[derive(Clone, Debug)]
pub struct HandlerConfig {
    /// Directory to store temporary uploads
    pub upload_dir: String,
    /// Maximum accepted upload size in bytes
    pub max_file_size: usize,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            upload_dir: env_or("UPLOAD_DIR", defaults::UPLOAD_DIR),
            max_file_size: env_parse_or("MAX_FILE_SIZE", defaults::MAX_FILE_SIZE),
        }
    }
}

impl HandlerConfig {
    /// Ensures the upload directory exists
    pub fn ensure_upload_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)
    }
}

/// Endpoints and credentials of the upstream services
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    pub transcription_url: String,
    /// Bearer credential for the transcription service
    pub transcription_api_key: String,
    pub video_search_url: String,
    pub video_api_key: String,
    pub book_search_url: String,
    /// `maxResults` sent to both search services
    pub max_results: u32,
    pub timeout_seconds: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            transcription_url: env_or("TRANSCRIPTION_API_URL", defaults::TRANSCRIPTION_API_URL),
            transcription_api_key: env_or("WORQHAT_API_KEY", ""),
            video_search_url: env_or("VIDEO_SEARCH_API_URL", defaults::VIDEO_SEARCH_API_URL),
            video_api_key: env_or("YOUTUBE_API_KEY", ""),
            book_search_url: env_or("BOOK_SEARCH_API_URL", defaults::BOOK_SEARCH_API_URL),
            max_results: env_parse_or("SEARCH_MAX_RESULTS", defaults::SEARCH_MAX_RESULTS),
            timeout_seconds: env_parse_or(
                "UPSTREAM_TIMEOUT_SECONDS",
                defaults::UPSTREAM_TIMEOUT_SECONDS,
            ),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Names of the credentials that are not configured
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.transcription_api_key.trim().is_empty() {
            missing.push("WORQHAT_API_KEY");
        }
        if self.video_api_key.trim().is_empty() {
            missing.push("YOUTUBE_API_KEY");
        }
        missing
    }
}

/// Configuration for metrics collection and export
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Type of metrics exporter ("prometheus", "none")
    pub exporter_type: String,
    /// Optional namespace prepended to every metric name
    pub namespace: Option<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        let metrics_enabled = env_parse_or("METRICS_ENABLED", true);

        let exporter_type = if !metrics_enabled {
            "disabled".to_string()
        } else {
            env::var("METRICS_BACKEND")
                .or_else(|_| env::var("METRICS_EXPORTER"))
                .unwrap_or_else(|_| "none".to_string())
        };

        Self {
            exporter_type,
            namespace: env::var("METRICS_NAMESPACE").ok(),
        }
    }
}
