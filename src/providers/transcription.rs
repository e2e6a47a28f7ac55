use async_trait::async_trait;
use log::{debug, info};
use reqwest::multipart;
use reqwest::StatusCode;
use std::path::Path;
use std::time::Duration;

use super::{build_client, ProviderError, TranscriptionProvider};
use crate::config::UpstreamConfig;
use crate::models::{Transcript, TranscriptionEnvelope};

const AUDIO_MIME: &str = "audio/webm";

/// Speech-to-text client posting the upload as multipart form data
pub struct HttpTranscriptionProvider {
    client: reqwest::Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpTranscriptionProvider {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ProviderError> {
        let timeout = config.timeout();
        Ok(Self {
            client: build_client(timeout)?,
            url: config.transcription_url.clone(),
            api_key: config.transcription_api_key.clone(),
            timeout,
        })
    }

    async fn build_form(audio: &Path, file_name: &str) -> Result<multipart::Form, ProviderError> {
        let data = tokio::fs::read(audio).await?;

        Ok(multipart::Form::new()
            .part("audio", audio_part(data, file_name, AUDIO_MIME)?)
            .text("keep_fillers", "false")
            .text("enable_formatting", "true")
            .text("enable_profanity_filters", "true"))
    }
}

fn audio_part(
    data: Vec<u8>,
    file_name: &str,
    mime: &str,
) -> Result<multipart::Part, ProviderError> {
    multipart::Part::bytes(data)
        .file_name(file_name.to_string())
        .mime_str(mime)
        .map_err(|e| ProviderError::InvalidRequest(format!("audio part mime {}: {}", mime, e)))
}

#[async_trait]
impl TranscriptionProvider for HttpTranscriptionProvider {
    async fn transcribe(&self, audio: &Path, file_name: &str) -> Result<Transcript, ProviderError> {
        let form = Self::build_form(audio, file_name).await?;

        debug!("Sending {} to transcription service", file_name);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        // Only a plain 200 counts as a transcript
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;
        if status != StatusCode::OK {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: TranscriptionEnvelope =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;

        info!(
            "Transcription {} completed ({} chars)",
            envelope.data.processing_id,
            envelope.data.text.len()
        );

        Ok(envelope.data)
    }
}
