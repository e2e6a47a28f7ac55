// Upstream service providers
//
// This module defines the contracts for the three external services the API forwards to,
// together with their reqwest-backed HTTP implementations.

pub mod book_search;
pub mod transcription;
pub mod video_search;

use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::models::{BookSummary, Transcript};

pub use self::book_search::HttpBookSearchProvider;
pub use self::transcription::HttpTranscriptionProvider;
pub use self::video_search::HttpVideoSearchProvider;

#[cfg(test)]
mod tests;

/// Errors raised while talking to an upstream service
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The upstream answered with a non-success status
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The upstream could not be reached
    #[error("request failed: {0}")]
    Transport(String),

    /// No answer within the configured timeout
    #[error("upstream did not respond within {0} seconds")]
    Timeout(u64),

    /// The upstream answered with a body that could not be decoded
    #[error("invalid upstream response: {0}")]
    Decode(String),

    /// The outbound request could not be assembled locally
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The stored upload could not be read back
    #[error("failed to read upload: {0}")]
    Io(#[from] io::Error),
}

impl ProviderError {
    /// Classifies a reqwest failure, keeping timeouts apart from other transport errors
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout.as_secs())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }

    /// Short outcome label used for metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Decode(_) => "decode",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Io(_) => "io",
        }
    }
}

/// Speech-to-text service
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Transcribes the audio file stored at `audio`, sent upstream as `file_name`
    async fn transcribe(&self, audio: &Path, file_name: &str) -> Result<Transcript, ProviderError>;
}

/// Video search service; results are passed through untouched
#[async_trait]
pub trait VideoSearchProvider: Send + Sync {
    async fn search_videos(&self, query: &str) -> Result<serde_json::Value, ProviderError>;
}

/// Book search service; results are projected to [`BookSummary`]
#[async_trait]
pub trait BookSearchProvider: Send + Sync {
    async fn search_books(&self, query: &str) -> Result<Vec<BookSummary>, ProviderError>;
}

/// Builds the shared reqwest client with the outbound timeout applied
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Transport(format!("failed to build HTTP client: {}", e)))
}

/// Turns a non-success response into [`ProviderError::Status`], keeping the raw body
pub(crate) async fn check_status(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::from_reqwest(e, timeout))?;
    Err(ProviderError::Status {
        status: status.as_u16(),
        body,
    })
}
