//! Metrics server router.
//!
//! - `GET /im-up`: health report
//! - `GET /metrics`: Prometheus text exposition
//! - anything else: 404 with an empty `text/plain` body

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

use crate::health::HealthSampler;
use crate::http::health;

pub fn router(sampler: Arc<HealthSampler>, prometheus: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(prometheus)
        .merge(health::routes(sampler))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
}

async fn render_metrics(State(prometheus): State<PrometheusHandle>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        prometheus.render(),
    )
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, "text/plain")], "")
}
