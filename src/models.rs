// Voice & Search API data models
//
// This module contains the data models used for the API.
// It includes request and response types as well as the upstream payload shapes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const NO_TITLE: &str = "No title available";
pub const NO_DESCRIPTION: &str = "No description available";
pub const NO_PREVIEW_URL: &str = "#";

/// Query string accepted by the search endpoints
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

/// Built from the raw query pairs; a repeated `query` keeps its first value
impl From<Vec<(String, String)>> for SearchQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self {
            query: pairs
                .into_iter()
                .find(|(key, _)| key == "query")
                .map(|(_, value)| value),
        }
    }
}

impl SearchQuery {
    /// Returns the query if present and non-empty
    pub fn non_empty(&self) -> Option<&str> {
        self.query.as_deref().filter(|query| !query.is_empty())
    }
}

/// Transcript extracted from the speech-to-text service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub processing_time: f64,
    #[serde(default, deserialize_with = "id_as_string")]
    pub processing_id: String,
}

/// Body returned by the speech-to-text service on success
#[derive(Debug, Default, Deserialize)]
pub struct TranscriptionEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Transcript,
}

/// Treats an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts the id as a string or any other scalar; `null` becomes empty
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(id) => id,
        other => other.to_string(),
    })
}

/// Response for a completed voice request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceProcessResponse {
    pub message: String,
    pub text: String,
    pub processing_time: f64,
    pub processing_id: String,
}

impl From<Transcript> for VoiceProcessResponse {
    fn from(transcript: Transcript) -> Self {
        Self {
            message: String::from("Voice processing completed"),
            text: transcript.text,
            processing_time: transcript.processing_time,
            processing_id: transcript.processing_id,
        }
    }
}

/// Body returned by the book search service
#[derive(Debug, Default, Deserialize)]
pub struct VolumesResponse {
    #[serde(default)]
    pub items: Vec<Volume>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    #[serde(default)]
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub preview_link: Option<String>,
}

/// Reduced view of a book search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    pub title: String,
    pub description: String,
    pub url: String,
}

impl From<Volume> for BookSummary {
    fn from(volume: Volume) -> Self {
        let info = volume.volume_info;
        Self {
            title: info.title.unwrap_or_else(|| NO_TITLE.to_string()),
            description: info.description.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            url: info.preview_link.unwrap_or_else(|| NO_PREVIEW_URL.to_string()),
        }
    }
}

impl VolumesResponse {
    /// Projects every returned volume down to a [`BookSummary`]
    pub fn into_summaries(self) -> Vec<BookSummary> {
        self.items.into_iter().map(BookSummary::from).collect()
    }
}

/// Error response for API
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Upstream body or failure detail, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Acknowledgement for CORS preflight requests
#[derive(Serialize)]
pub struct PreflightResponse {
    pub message: String,
}

/// Health check payload
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}
