//! Development CDN: serves locally built module assets under `/static`.

use std::path::Path;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub const STATIC_PATH: &str = "/static";

pub fn router(static_dir: &Path) -> Router {
    Router::new()
        .nest_service(STATIC_PATH, ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
