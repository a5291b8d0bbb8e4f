//! Health sampling for the `/im-up` endpoint.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::SampleError;
use crate::health::process::{tick_delay, ProcessProbe};
use crate::health::report::{HealthReport, HealthStatus, HolocronReport, ProcessReport, Thresholds};
use crate::holocron::ModuleState;
use crate::observability::metrics;

/// Outcome of one health check as seen by the polling client.
#[derive(Debug)]
pub enum HealthCheck {
    Report(HealthReport),
    /// Sampling failed; the client gets a bare 500.
    Failed,
}

impl HealthCheck {
    pub fn status(&self) -> HealthStatus {
        match self {
            HealthCheck::Report(report) => report.status,
            HealthCheck::Failed => HealthStatus::Error,
        }
    }
}

impl IntoResponse for HealthCheck {
    fn into_response(self) -> Response {
        let code = StatusCode::from_u16(self.status().code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self {
            HealthCheck::Report(report) => (code, Json(report)).into_response(),
            HealthCheck::Failed => (code, "").into_response(),
        }
    }
}

/// Fuses process metrics and module state into a [`HealthReport`].
pub struct HealthSampler {
    probe: Arc<dyn ProcessProbe>,
    modules: Arc<dyn ModuleState>,
    root_module_name: String,
    thresholds: Thresholds,
}

impl HealthSampler {
    pub fn new(
        probe: Arc<dyn ProcessProbe>,
        modules: Arc<dyn ModuleState>,
        root_module_name: impl Into<String>,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            probe,
            modules,
            root_module_name: root_module_name.into(),
            thresholds,
        }
    }

    /// Take one sample, propagating collection failures.
    pub async fn sample(&self) -> Result<HealthReport, SampleError> {
        let (stats, tick_delay) = tokio::join!(self.probe.stats(), tick_delay());
        let stats = stats?;

        let holocron = HolocronReport {
            root_module_exists: self.modules.is_module_loaded(&self.root_module_name),
            module_map_healthy: self.modules.is_module_map_healthy(),
            status: None,
        };
        let process = ProcessReport {
            cpu: stats.cpu,
            memory: stats.memory,
            tick_delay,
            status: None,
        };

        Ok(HealthReport::new(process, holocron, &self.thresholds))
    }

    /// Take one sample for a polling client. Never fails.
    pub async fn check(&self) -> HealthCheck {
        let check = match self.sample().await {
            Ok(report) => {
                metrics::record_process(report.process.cpu, report.process.memory);
                HealthCheck::Report(report)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Health sample failed");
                HealthCheck::Failed
            }
        };
        metrics::record_health_check(check.status());
        check
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::process::ProcessStats;
    use async_trait::async_trait;
    use axum::body::to_bytes;

    struct FixedProbe(Option<ProcessStats>);

    #[async_trait]
    impl ProcessProbe for FixedProbe {
        async fn stats(&self) -> Result<ProcessStats, SampleError> {
            self.0.ok_or(SampleError::ProcessNotFound(42))
        }
    }

    struct FixedModules {
        loaded: bool,
        healthy: bool,
    }

    impl ModuleState for FixedModules {
        fn is_module_loaded(&self, name: &str) -> bool {
            self.loaded && name == "root"
        }

        fn is_module_map_healthy(&self) -> bool {
            self.healthy
        }
    }

    fn sampler(stats: Option<ProcessStats>, loaded: bool, healthy: bool) -> HealthSampler {
        HealthSampler::new(
            Arc::new(FixedProbe(stats)),
            Arc::new(FixedModules { loaded, healthy }),
            "root",
            Thresholds::default(),
        )
    }

    const CALM: Option<ProcessStats> = Some(ProcessStats { cpu: 50.0, memory: 1_000_000_000 });

    #[tokio::test]
    async fn reports_ok_when_everything_is_within_limits() {
        let report = sampler(CALM, true, true).sample().await.unwrap();
        assert_eq!(report.status, HealthStatus::Ok);
        assert!(report.holocron.root_module_exists);
    }

    #[tokio::test]
    async fn stale_map_is_partial() {
        let report = sampler(CALM, true, false).sample().await.unwrap();
        assert_eq!(report.status, HealthStatus::Partial);
        assert_eq!(report.process.status, Some(200));
        assert_eq!(report.holocron.status, Some(500));
    }

    #[tokio::test]
    async fn missing_root_module_degrades() {
        let report = sampler(CALM, false, true).sample().await.unwrap();
        assert_eq!(report.status, HealthStatus::Degraded);
    }

    #[tokio::test]
    async fn hot_cpu_degrades() {
        let hot = Some(ProcessStats { cpu: 90.0, memory: 1_000_000_000 });
        let report = sampler(hot, true, true).sample().await.unwrap();
        assert_eq!(report.status, HealthStatus::Degraded);
    }

    #[tokio::test]
    async fn probe_failure_becomes_empty_500() {
        let check = sampler(None, true, true).check().await;
        assert_eq!(check.status(), HealthStatus::Error);

        let response = check.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn response_status_mirrors_report() {
        let response = sampler(CALM, true, false).check().await.into_response();
        assert_eq!(response.status().as_u16(), 207);
    }
}
