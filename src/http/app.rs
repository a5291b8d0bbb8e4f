//! Primary application server router.
//!
//! Page rendering and module serving happen outside this crate; the app
//! server exposes the health route with request tracing around it.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::health::HealthSampler;
use crate::http::health;

pub fn router(sampler: Arc<HealthSampler>) -> Router {
    health::routes(sampler).layer(TraceLayer::new_for_http())
}
