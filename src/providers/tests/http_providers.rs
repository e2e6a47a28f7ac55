//! Wire-level tests for the reqwest providers
//!
//! Each test starts a local actix server playing the upstream service and points
//! the provider at it.

use crate::config::UpstreamConfig;
use crate::models::NO_DESCRIPTION;
use crate::providers::{
    BookSearchProvider, HttpBookSearchProvider, HttpTranscriptionProvider,
    HttpVideoSearchProvider, ProviderError, TranscriptionProvider, VideoSearchProvider,
};
use actix_multipart::Multipart;
use actix_web::dev::ServerHandle;
use actix_web::{http::header, web, App, HttpRequest, HttpResponse, HttpServer};
use futures::{StreamExt, TryStreamExt};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

const API_KEY: &str = "test-key";

/// Mock speech-to-text endpoint
///
/// Replies with a transcript whose text lists the received form fields in order:
/// `name=value` for text fields and `name:filename:len` for files.
async fn mock_transcribe(req: HttpRequest, mut form: Multipart) -> HttpResponse {
    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some("Bearer test-key");
    if !authorized {
        return HttpResponse::Unauthorized().body("invalid api key");
    }

    let mut fields = Vec::new();
    while let Ok(Some(mut field)) = form.try_next().await {
        let (name, file_name) = field
            .content_disposition()
            .map(|cd| {
                (
                    cd.get_name().unwrap_or_default().to_string(),
                    cd.get_filename().map(str::to_string),
                )
            })
            .unwrap_or_default();

        let mut content = Vec::new();
        while let Some(Ok(chunk)) = field.next().await {
            content.extend_from_slice(&chunk);
        }

        fields.push(match file_name {
            Some(file_name) => format!("{}:{}:{}", name, file_name, content.len()),
            None => format!("{}={}", name, String::from_utf8_lossy(&content)),
        });
    }

    HttpResponse::Ok().json(json!({
        "data": {
            "text": fields.join(","),
            "processingTime": 1.2,
            "processingId": "abc"
        }
    }))
}

async fn mock_unavailable() -> HttpResponse {
    HttpResponse::ServiceUnavailable().body("upstream down")
}

async fn mock_garbage() -> HttpResponse {
    HttpResponse::Ok().content_type("application/json").body("not json")
}

async fn mock_slow() -> HttpResponse {
    actix_web::rt::time::sleep(Duration::from_secs(5)).await;
    HttpResponse::Ok().json(json!({}))
}

/// Mock video search endpoint echoing the query string it received
async fn mock_videos(params: web::Query<HashMap<String, String>>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "kind": "youtube#searchListResponse",
        "items": [{ "id": { "videoId": "abc123" } }],
        "echo": params.into_inner(),
    }))
}

/// Mock book search endpoint
async fn mock_books(params: web::Query<HashMap<String, String>>) -> HttpResponse {
    let query = params.get("q").cloned().unwrap_or_default();
    if query == "nothing" {
        return HttpResponse::Ok().json(json!({ "kind": "books#volumes", "totalItems": 0 }));
    }

    let max_results = params.get("maxResults").cloned().unwrap_or_default();
    HttpResponse::Ok().json(json!({
        "kind": "books#volumes",
        "items": [
            {
                "volumeInfo": {
                    "title": format!("{} ({})", query, max_results),
                    "description": "A book",
                    "previewLink": "http://books.example/1"
                }
            },
            { "volumeInfo": { "title": "Untold" } }
        ]
    }))
}

async fn mock_forbidden() -> HttpResponse {
    HttpResponse::Forbidden().body("quotaExceeded")
}

fn mock_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/speech-text", web::post().to(mock_transcribe))
        .route("/speech-text-down", web::post().to(mock_unavailable))
        .route("/speech-text-garbage", web::post().to(mock_garbage))
        .route("/slow", web::post().to(mock_slow))
        .route("/slow", web::get().to(mock_slow))
        .route("/youtube", web::get().to(mock_videos))
        .route("/youtube-forbidden", web::get().to(mock_forbidden))
        .route("/books", web::get().to(mock_books))
        .route("/books-garbage", web::get().to(mock_garbage));
}

/// Starts the mock upstream on an ephemeral port
fn start_upstream() -> (String, ServerHandle) {
    let server = HttpServer::new(|| App::new().configure(mock_routes))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("Failed to bind mock upstream");
    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    (format!("http://{}", addr), handle)
}

fn upstream_config(base: &str, path_suffix: &str) -> UpstreamConfig {
    UpstreamConfig {
        transcription_url: format!("{}/speech-text{}", base, path_suffix),
        transcription_api_key: API_KEY.to_string(),
        video_search_url: format!("{}/youtube{}", base, path_suffix),
        video_api_key: "yt-key".to_string(),
        book_search_url: format!("{}/books{}", base, path_suffix),
        max_results: 5,
        timeout_seconds: 1,
    }
}

fn stored_audio(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("voice_test.webm");
    std::fs::write(&path, b"12345").unwrap();
    path
}

#[actix_web::test]
async fn test_transcription_sends_audio_and_fixed_options() {
    let (base, handle) = start_upstream();
    let provider = HttpTranscriptionProvider::new(&upstream_config(&base, "")).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let audio = stored_audio(&dir);

    let transcript = provider
        .transcribe(&audio, "voice_test.webm")
        .await
        .unwrap();

    assert_eq!(
        transcript.text,
        "audio:voice_test.webm:5,keep_fillers=false,enable_formatting=true,enable_profanity_filters=true"
    );
    assert_eq!(transcript.processing_time, 1.2);
    assert_eq!(transcript.processing_id, "abc");

    handle.stop(false).await;
}

#[actix_web::test]
async fn test_transcription_rejected_credential_keeps_upstream_body() {
    let (base, handle) = start_upstream();
    let mut config = upstream_config(&base, "");
    config.transcription_api_key = "wrong".to_string();
    let provider = HttpTranscriptionProvider::new(&config).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let audio = stored_audio(&dir);

    let err = provider.transcribe(&audio, "voice_test.webm").await.unwrap_err();
    match err {
        ProviderError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    handle.stop(false).await;
}

#[actix_web::test]
async fn test_transcription_upstream_errors() {
    let (base, handle) = start_upstream();
    let dir = tempfile::tempdir().unwrap();
    let audio = stored_audio(&dir);

    let provider = HttpTranscriptionProvider::new(&upstream_config(&base, "-down")).unwrap();
    let err = provider.transcribe(&audio, "voice_test.webm").await.unwrap_err();
    assert!(matches!(err, ProviderError::Status { status: 503, .. }));

    let provider = HttpTranscriptionProvider::new(&upstream_config(&base, "-garbage")).unwrap();
    let err = provider.transcribe(&audio, "voice_test.webm").await.unwrap_err();
    assert!(matches!(err, ProviderError::Decode(_)));

    let err = provider
        .transcribe(&dir.path().join("missing.webm"), "missing.webm")
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Io(_)));

    handle.stop(false).await;
}

#[actix_web::test]
async fn test_slow_upstream_times_out() {
    let (base, handle) = start_upstream();
    let mut config = upstream_config(&base, "");
    config.transcription_url = format!("{}/slow", base);
    config.book_search_url = format!("{}/slow", base);
    let dir = tempfile::tempdir().unwrap();
    let audio = stored_audio(&dir);

    let provider = HttpTranscriptionProvider::new(&config).unwrap();
    let err = provider.transcribe(&audio, "voice_test.webm").await.unwrap_err();
    assert!(matches!(err, ProviderError::Timeout(1)));

    let provider = HttpBookSearchProvider::new(&config).unwrap();
    let err = provider.search_books("rust").await.unwrap_err();
    assert!(matches!(err, ProviderError::Timeout(1)));

    handle.stop(false).await;
}

#[actix_web::test]
async fn test_video_search_sends_expected_parameters() {
    let (base, handle) = start_upstream();
    let provider = HttpVideoSearchProvider::new(&upstream_config(&base, "")).unwrap();

    let body = provider.search_videos("rust & tokio").await.unwrap();

    assert_eq!(body["kind"], "youtube#searchListResponse");
    assert_eq!(body["items"][0]["id"]["videoId"], "abc123");
    assert_eq!(
        body["echo"],
        json!({
            "q": "rust & tokio",
            "key": "yt-key",
            "part": "snippet",
            "type": "video",
            "maxResults": "5"
        })
    );

    handle.stop(false).await;
}

#[actix_web::test]
async fn test_video_search_failure_status() {
    let (base, handle) = start_upstream();
    let provider = HttpVideoSearchProvider::new(&upstream_config(&base, "-forbidden")).unwrap();

    let err = provider.search_videos("rust").await.unwrap_err();
    match err {
        ProviderError::Status { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "quotaExceeded");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    handle.stop(false).await;
}

#[actix_web::test]
async fn test_book_search_projects_items() {
    let (base, handle) = start_upstream();
    let provider = HttpBookSearchProvider::new(&upstream_config(&base, "")).unwrap();

    let books = provider.search_books("rust").await.unwrap();

    assert_eq!(books.len(), 2);
    assert_eq!(books[0].title, "rust (5)");
    assert_eq!(books[0].description, "A book");
    assert_eq!(books[0].url, "http://books.example/1");
    assert_eq!(books[1].title, "Untold");
    assert_eq!(books[1].description, NO_DESCRIPTION);
    assert_eq!(books[1].url, "#");

    let books = provider.search_books("nothing").await.unwrap();
    assert!(books.is_empty());

    handle.stop(false).await;
}

#[actix_web::test]
async fn test_book_search_undecodable_body() {
    let (base, handle) = start_upstream();
    let provider = HttpBookSearchProvider::new(&upstream_config(&base, "-garbage")).unwrap();

    let err = provider.search_books("rust").await.unwrap_err();
    assert!(matches!(err, ProviderError::Decode(_)));

    handle.stop(false).await;
}

#[actix_web::test]
async fn test_unreachable_upstream_is_transport_error() {
    // Nothing listens on port 1
    let provider = HttpVideoSearchProvider::new(&upstream_config("http://127.0.0.1:1", "")).unwrap();

    let err = provider.search_videos("rust").await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));
}
