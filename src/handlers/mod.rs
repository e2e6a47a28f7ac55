// Voice & Search API HTTP handlers
//
// This module contains the HTTP handlers for the API.
// It provides the interface between HTTP requests and the upstream providers.

pub mod cors;
pub mod form;
pub mod routes;

use actix_web::web;

// Re-export handlers for easier access
pub use self::routes::{
    books_preflight, health_check, metrics_export, process_voice, search_books, search_videos,
    videos_preflight,
};
// Re-export CORS middleware
pub use self::cors::Cors;


/// Registers every endpoint of the API
///
/// Expects `HandlerConfig`, `Metrics` and the three provider trait objects to be
/// registered as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(process_voice)
        .service(search_videos)
        .service(videos_preflight)
        .service(search_books)
        .service(books_preflight)
        .service(metrics_export);
}
