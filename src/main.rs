use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};
use std::sync::Arc;

use voice_search_api::config_loader::load_config;
use voice_search_api::metrics::create_metrics_exporter;
use voice_search_api::{
    configure, BookSearchProvider, Cors, HandlerConfig, HttpBookSearchProvider,
    HttpTranscriptionProvider, HttpVideoSearchProvider, Metrics, MetricsConfig,
    TranscriptionProvider, UpstreamConfig, VideoSearchProvider,
};

const DEFAULT_VOICE_API_HOST: &str = "127.0.0.1";
const DEFAULT_VOICE_API_PORT: &str = "5001";
const DEFAULT_VOICE_API_KEEPALIVE: u64 = 75;

fn io_error<E: std::fmt::Display>(context: &str, err: E) -> std::io::Error {
    std::io::Error::other(format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // Config file values become env vars unless already set
    if !load_config() {
        info!("No configuration file loaded, using environment and defaults");
    }
    let handler_config = HandlerConfig::default();
    let upstream_config = UpstreamConfig::default();
    let metrics_config = MetricsConfig::default();

    for key in upstream_config.missing_credentials() {
        warn!("{} is not set; requests to that service will be rejected upstream", key);
    }

    let metrics = Metrics::new(create_metrics_exporter(
        &metrics_config.exporter_type,
        metrics_config.namespace.as_deref(),
    ));

    if let Err(e) = handler_config.ensure_upload_dir() {
        warn!(
            "Failed to create upload directory {}: {}",
            handler_config.upload_dir, e
        );
    }

    let transcriber: Arc<dyn TranscriptionProvider> = Arc::new(
        HttpTranscriptionProvider::new(&upstream_config)
            .map_err(|e| io_error("transcription client", e))?,
    );
    let video_search: Arc<dyn VideoSearchProvider> = Arc::new(
        HttpVideoSearchProvider::new(&upstream_config)
            .map_err(|e| io_error("video search client", e))?,
    );
    let book_search: Arc<dyn BookSearchProvider> = Arc::new(
        HttpBookSearchProvider::new(&upstream_config)
            .map_err(|e| io_error("book search client", e))?,
    );

    // Server settings
    let host =
        std::env::var("VOICE_API_HOST").unwrap_or_else(|_| DEFAULT_VOICE_API_HOST.to_string());
    let port =
        std::env::var("VOICE_API_PORT").unwrap_or_else(|_| DEFAULT_VOICE_API_PORT.to_string());
    let keep_alive = std::time::Duration::from_secs(
        std::env::var("VOICE_API_KEEPALIVE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_VOICE_API_KEEPALIVE),
    );
    let workers = std::env::var("HTTP_WORKER_NUMBER")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n: &usize| *n > 0)
        .unwrap_or_else(num_cpus::get);

    info!("Starting Voice & Search API server on http://{}:{}", host, port);
    info!("Using upload directory: {}", handler_config.upload_dir);
    info!("Transcription endpoint: {}", upstream_config.transcription_url);
    info!("Video search endpoint: {}", upstream_config.video_search_url);
    info!("Book search endpoint: {}", upstream_config.book_search_url);
    info!("Upstream timeout: {}s", upstream_config.timeout_seconds);
    info!("Metrics exporter: {}", metrics_config.exporter_type);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors)
            .app_data(web::Data::new(handler_config.clone()))
            .app_data(web::Data::new(metrics.clone()))
            .app_data(web::Data::from(transcriber.clone()))
            .app_data(web::Data::from(video_search.clone()))
            .app_data(web::Data::from(book_search.clone()))
            .configure(configure)
    })
    .workers(workers)
    .bind(format!("{}:{}", host, port))?
    .keep_alive(keep_alive)
    .run()
    .await
}
