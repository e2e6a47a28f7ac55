// API route handlers for the Voice & Search API
//
// This module contains the route handlers for the API.
// It implements the actual HTTP endpoints and records request metrics for each of them.

use crate::config::HandlerConfig;
use crate::error::HandlerError;
use crate::handlers::form::extract_audio_upload;
use crate::metrics::Metrics;
use crate::models::{
    ErrorResponse, HealthResponse, PreflightResponse, SearchQuery, VoiceProcessResponse,
};
use crate::providers::{
    BookSearchProvider, ProviderError, TranscriptionProvider, VideoSearchProvider,
};
use actix_multipart::Multipart;
use actix_web::{get, options, post, web, HttpResponse, ResponseError};
use log::{error, info, warn};
use std::time::Instant;

/// Record request count and latency from a handler result
async fn record_request(
    metrics: &Metrics,
    endpoint: &str,
    method: &str,
    result: &Result<HttpResponse, HandlerError>,
    start_time: Instant,
) {
    let status = match result {
        Ok(response) => response.status(),
        Err(e) => e.status_code(),
    };
    metrics
        .record_http_request(
            endpoint,
            method,
            status.as_str(),
            start_time.elapsed().as_secs_f64(),
        )
        .await;
}

fn preflight_response() -> HttpResponse {
    HttpResponse::Ok().json(PreflightResponse {
        message: String::from("Preflight request successful"),
    })
}

/// Handler for voice processing requests
///
/// Receives an audio file in the `audio` multipart field, stores it temporarily,
/// forwards it to the transcription service and returns the transcript.
/// The stored file is removed before the handler returns, whatever the outcome.
#[post("/api/voice/process")]
pub async fn process_voice(
    form: Multipart,
    config: web::Data<HandlerConfig>,
    transcriber: web::Data<dyn TranscriptionProvider>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, HandlerError> {
    let start_time = Instant::now();
    let result = transcribe_upload(form, &config, transcriber.get_ref(), &metrics).await;
    record_request(&metrics, "/api/voice/process", "POST", &result, start_time).await;
    result
}

async fn transcribe_upload(
    form: Multipart,
    config: &HandlerConfig,
    transcriber: &dyn TranscriptionProvider,
    metrics: &Metrics,
) -> Result<HttpResponse, HandlerError> {
    let upload = extract_audio_upload(form, config).await?;
    metrics.record_upload_size(upload.size()).await;

    let result = transcriber
        .transcribe(upload.path(), upload.file_name())
        .await;
    metrics
        .record_upstream_call(
            "transcription",
            result.as_ref().map_or_else(|e| e.outcome(), |_| "success"),
        )
        .await;

    let transcript = result.map_err(|e| {
        error!("Speech recognition failed for {}: {}", upload.file_name(), e);
        match e {
            // The stored upload could not be read back; nothing reached the upstream
            ProviderError::Io(io_err) => HandlerError::FileError(io_err),
            other => HandlerError::Transcription(other),
        }
    })?;

    info!(
        "Speech recognition successful for {} (id: {})",
        upload.file_name(),
        transcript.processing_id
    );
    drop(upload);

    Ok(HttpResponse::Ok().json(VoiceProcessResponse::from(transcript)))
}

/// Video search endpoint
///
/// Forwards the query to the video search service and returns its payload unmodified.
#[get("/videos")]
pub async fn search_videos(
    query: web::Query<Vec<(String, String)>>,
    provider: web::Data<dyn VideoSearchProvider>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, HandlerError> {
    let start_time = Instant::now();
    let query = SearchQuery::from(query.into_inner());
    let result = find_videos(&query, provider.get_ref(), &metrics).await;
    record_request(&metrics, "/videos", "GET", &result, start_time).await;
    result
}

async fn find_videos(
    query: &SearchQuery,
    provider: &dyn VideoSearchProvider,
    metrics: &Metrics,
) -> Result<HttpResponse, HandlerError> {
    let query = query.non_empty().ok_or_else(|| {
        warn!("Video search without query");
        HandlerError::MissingQuery
    })?;

    let result = provider.search_videos(query).await;
    metrics
        .record_upstream_call(
            "video_search",
            result.as_ref().map_or_else(|e| e.outcome(), |_| "success"),
        )
        .await;

    let videos = result.map_err(|e| {
        error!("Video search for '{}' failed: {}", query, e);
        HandlerError::Search {
            target: "videos",
            source: e,
        }
    })?;

    info!("Video search for '{}' completed", query);
    Ok(HttpResponse::Ok().json(videos))
}

/// Preflight acknowledgement for the video search endpoint
#[options("/videos")]
pub async fn videos_preflight() -> HttpResponse {
    preflight_response()
}

/// Book search endpoint
///
/// Forwards the query to the book search service and returns the projected
/// `{title, description, url}` list.
#[get("/books")]
pub async fn search_books(
    query: web::Query<Vec<(String, String)>>,
    provider: web::Data<dyn BookSearchProvider>,
    metrics: web::Data<Metrics>,
) -> Result<HttpResponse, HandlerError> {
    let start_time = Instant::now();
    let query = SearchQuery::from(query.into_inner());
    let result = find_books(&query, provider.get_ref(), &metrics).await;
    record_request(&metrics, "/books", "GET", &result, start_time).await;
    result
}

async fn find_books(
    query: &SearchQuery,
    provider: &dyn BookSearchProvider,
    metrics: &Metrics,
) -> Result<HttpResponse, HandlerError> {
    let query = query.non_empty().ok_or_else(|| {
        warn!("Book search without query");
        HandlerError::MissingQuery
    })?;

    let result = provider.search_books(query).await;
    metrics
        .record_upstream_call(
            "book_search",
            result.as_ref().map_or_else(|e| e.outcome(), |_| "success"),
        )
        .await;

    let books = result.map_err(|e| {
        error!("Book search for '{}' failed: {}", query, e);
        HandlerError::Search {
            target: "books",
            source: e,
        }
    })?;

    info!("Book search for '{}' returned {} items", query, books.len());
    Ok(HttpResponse::Ok().json(books))
}

/// Preflight acknowledgement for the book search endpoint
#[options("/books")]
pub async fn books_preflight() -> HttpResponse {
    preflight_response()
}

/// Health check
#[get("/")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: String::from("API is working properly"),
    })
}

/// Metrics endpoint in the configured exporter's format
#[get("/metrics")]
pub async fn metrics_export(metrics: web::Data<Metrics>) -> HttpResponse {
    match metrics.export().await {
        Ok(data) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4; charset=utf-8")
            .body(data),
        Err(e) => {
            error!("Failed to export metrics: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: e.to_string(),
                details: None,
            })
        }
    }
}
