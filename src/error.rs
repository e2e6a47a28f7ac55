// Error handling for the Voice & Search API
//
// This module defines error types and handling for the HTTP handlers.
// It centralizes error definitions and maps them onto HTTP responses.

use std::io;
use thiserror::Error;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::models::ErrorResponse;
use crate::providers::ProviderError;

/// Errors that can occur in the API handlers
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Error when processing multipart form data
    #[error("Form error: {0}")]
    FormError(String),

    /// Error when saving or reading file data
    #[error("File error: {0}")]
    FileError(#[from] io::Error),

    /// Error when no audio file was provided
    #[error("No audio file provided")]
    NoAudioFile,

    /// Error when the audio field carries an empty filename
    #[error("No selected file")]
    EmptyFilename,

    /// Error when a file is too large
    #[error("File too large: {0} bytes exceeds limit of {1} bytes")]
    FileTooLarge(usize, usize),

    /// Error when a search request has no query
    #[error("Query parameter is required")]
    MissingQuery,

    /// Error raised by the speech-to-text service
    #[error("Failed to process speech")]
    Transcription(#[source] ProviderError),

    /// Error raised by one of the search services
    #[error("Failed to fetch {target}")]
    Search {
        target: &'static str,
        #[source]
        source: ProviderError,
    },
}

impl HandlerError {
    /// Create a new FormError
    pub fn form_error<S: Into<String>>(msg: S) -> Self {
        Self::FormError(msg.into())
    }

    /// Detail echoed to the client next to the error message
    fn details(&self) -> Option<String> {
        match self {
            // The raw upstream body is passed through as-is
            HandlerError::Transcription(ProviderError::Status { body, .. }) => Some(body.clone()),
            HandlerError::Transcription(source) | HandlerError::Search { source, .. } => {
                Some(source.to_string())
            }
            _ => None,
        }
    }
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::NoAudioFile
            | HandlerError::EmptyFilename
            | HandlerError::MissingQuery
            | HandlerError::FormError(_) => StatusCode::BAD_REQUEST,
            HandlerError::FileTooLarge(_, _) => StatusCode::PAYLOAD_TOO_LARGE,
            HandlerError::Transcription(ProviderError::Status { status, .. }) => {
                // A 2xx other than 200 is still a failure here, never echoed as success
                StatusCode::from_u16(*status)
                    .ok()
                    .filter(|code| !code.is_success())
                    .unwrap_or(StatusCode::BAD_GATEWAY)
            }
            HandlerError::Transcription(ProviderError::Timeout(_))
            | HandlerError::Search {
                source: ProviderError::Timeout(_),
                ..
            } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_response = ErrorResponse {
            error: self.to_string(),
            details: self.details(),
        };

        HttpResponse::build(self.status_code()).json(error_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use serde_json::{json, Value};

    async fn body_of(err: HandlerError) -> (StatusCode, Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn test_validation_errors_are_bad_requests() {
        let (status, body) = body_of(HandlerError::MissingQuery).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Query parameter is required" }));

        let (status, body) = body_of(HandlerError::EmptyFilename).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No selected file" }));
    }

    #[actix_web::test]
    async fn test_transcription_status_is_propagated_with_raw_body() {
        let err = HandlerError::Transcription(ProviderError::Status {
            status: 401,
            body: "{\"message\":\"bad key\"}".to_string(),
        });
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Failed to process speech");
        assert_eq!(body["details"], "{\"message\":\"bad key\"}");
    }

    #[actix_web::test]
    async fn test_search_failures_are_internal_errors() {
        let err = HandlerError::Search {
            target: "books",
            source: ProviderError::Status {
                status: 403,
                body: "quota".to_string(),
            },
        };
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch books");
        assert!(body["details"].as_str().unwrap().contains("403"));
    }

    #[actix_web::test]
    async fn test_timeouts_map_to_gateway_timeout() {
        let err = HandlerError::Search {
            target: "videos",
            source: ProviderError::Timeout(30),
        };
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            HandlerError::Transcription(ProviderError::Timeout(30)).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_file_errors_are_internal() {
        let err = HandlerError::from(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            HandlerError::FileTooLarge(10, 5).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }
}
