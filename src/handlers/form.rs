// Form data processing for the voice endpoint
//
// This module handles the extraction of the uploaded audio file from multipart form data.
// The upload is written to disk and handed back as a guard that removes it when dropped.

use actix_multipart::Multipart;
use futures::{StreamExt, TryStreamExt};
use log::{error, info, warn};

use crate::config::{defaults, HandlerConfig};
use crate::error::HandlerError;
use crate::file_utils::TempUpload;

/// Name of the multipart field carrying the audio file
pub const AUDIO_FIELD: &str = "audio";

/// Extract the audio file from a multipart request and store it temporarily
///
/// # Errors
///
/// * `NoAudioFile` when no `audio` file field is present
/// * `EmptyFilename` when the `audio` field carries an empty filename
/// * `FileTooLarge` when the upload exceeds `config.max_file_size`
/// * `FormError` when the multipart stream is malformed
/// * `FileError` when the upload cannot be written
pub async fn extract_audio_upload(
    mut form: Multipart,
    config: &HandlerConfig,
) -> Result<TempUpload, HandlerError> {
    let mut audio_data: Option<Vec<u8>> = None;
    let mut saw_empty_filename = false;

    while let Some(mut field) = form
        .try_next()
        .await
        .map_err(|e| HandlerError::form_error(format!("Error reading form: {}", e)))?
    {
        let (field_name, file_name) = field
            .content_disposition()
            .map(|cd| {
                (
                    cd.get_name().map(str::to_string).unwrap_or_default(),
                    cd.get_filename().map(str::to_string),
                )
            })
            .unwrap_or_default();

        // Only the first audio file is kept; every other field is drained
        let accept = field_name == AUDIO_FIELD && audio_data.is_none();
        match file_name.as_deref() {
            Some("") if accept => saw_empty_filename = true,
            Some(_) if accept => {
                let mut data = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| {
                        HandlerError::form_error(format!("Error processing file upload: {}", e))
                    })?;

                    if data.len() + chunk.len() > config.max_file_size {
                        warn!("Rejected upload larger than {} bytes", config.max_file_size);
                        return Err(HandlerError::FileTooLarge(
                            data.len() + chunk.len(),
                            config.max_file_size,
                        ));
                    }
                    data.extend_from_slice(&chunk);
                }
                audio_data = Some(data);
                continue;
            }
            _ => {}
        }

        while let Some(chunk) = field.next().await {
            chunk.map_err(|e| {
                HandlerError::form_error(format!("Error reading field {}: {}", field_name, e))
            })?;
        }
    }

    let data = match audio_data {
        Some(data) => data,
        None if saw_empty_filename => {
            warn!("Empty audio filename");
            return Err(HandlerError::EmptyFilename);
        }
        None => {
            warn!("No audio file in request");
            return Err(HandlerError::NoAudioFile);
        }
    };

    let upload = TempUpload::create(
        &config.upload_dir,
        defaults::UPLOAD_PREFIX,
        defaults::UPLOAD_EXTENSION,
        &data,
    )
    .map_err(|e| {
        error!("Failed to store audio upload: {}", e);
        HandlerError::FileError(e)
    })?;

    info!(
        "Audio file saved successfully: {} ({} bytes)",
        upload.file_name(),
        upload.size()
    );
    Ok(upload)
}
