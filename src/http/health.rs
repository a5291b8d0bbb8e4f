//! `/im-up` health route shared by the app and metrics servers.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Router;

use crate::health::{HealthCheck, HealthSampler};

pub const HEALTH_PATH: &str = "/im-up";

pub fn routes(sampler: Arc<HealthSampler>) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health_check))
        .with_state(sampler)
}

async fn health_check(State(sampler): State<Arc<HealthSampler>>) -> HealthCheck {
    sampler.check().await
}
