//! Metrics collection and exposition.
//!
//! # Metrics
//! - `health_checks_total` (counter): health checks by reported status
//! - `process_cpu_percent` (gauge): CPU usage at the last health sample
//! - `process_resident_memory_bytes` (gauge): RSS at the last health sample

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::health::HealthStatus;

/// Install the global Prometheus recorder and return a render handle.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// A handle whose recorder is not installed globally. Used in tests and
/// wherever a second metrics server would otherwise clash with the first.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

pub fn record_health_check(status: HealthStatus) {
    metrics::counter!("health_checks_total", "status" => status.code().to_string()).increment(1);
}

pub fn record_process(cpu: f64, memory: u64) {
    metrics::gauge!("process_cpu_percent").set(cpu);
    metrics::gauge!("process_resident_memory_bytes").set(memory as f64);
}
