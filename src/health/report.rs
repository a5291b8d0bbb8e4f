//! Health report model and classification.
//!
//! # Classification (first match wins)
//! ```text
//! module map stale                       → 207 Partial
//! cpu, memory, tick delay within limits
//!   and root module loaded               → 200 Ok
//! otherwise                              → 503 Degraded
//! ```
//! A sampling failure is reported as 500 by the sampler, never here.

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::config::HealthConfig;

/// Composite health status, serialized as its HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Ok,
    Partial,
    Degraded,
    Error,
}

impl HealthStatus {
    pub fn code(self) -> u16 {
        match self {
            HealthStatus::Ok => 200,
            HealthStatus::Partial => 207,
            HealthStatus::Degraded => 503,
            HealthStatus::Error => 500,
        }
    }
}

impl Serialize for HealthStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.code())
    }
}

/// Limits a healthy process stays within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Inclusive.
    pub max_cpu_percent: f64,
    /// Inclusive.
    pub max_memory_bytes: u64,
    /// Exclusive.
    pub max_tick_delay: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from(&HealthConfig::default())
    }
}

impl From<&HealthConfig> for Thresholds {
    fn from(config: &HealthConfig) -> Self {
        Self {
            max_cpu_percent: config.max_cpu_percent,
            max_memory_bytes: config.max_memory_bytes,
            max_tick_delay: config.max_tick_delay(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessReport {
    pub cpu: f64,
    pub memory: u64,
    /// `[seconds, nanoseconds]`.
    #[serde(serialize_with = "hrtime")]
    pub tick_delay: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolocronReport {
    pub root_module_exists: bool,
    pub module_map_healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// One health sample. Built fresh per request and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub process: ProcessReport,
    pub holocron: HolocronReport,
    pub status: HealthStatus,
}

impl HealthReport {
    /// Classify the sub-reports and annotate them for the partial case.
    pub fn new(mut process: ProcessReport, mut holocron: HolocronReport, thresholds: &Thresholds) -> Self {
        let status = classify(&process, &holocron, thresholds);
        if status == HealthStatus::Partial {
            process.status = Some(HealthStatus::Ok.code());
            holocron.status = Some(HealthStatus::Error.code());
        }
        Self { process, holocron, status }
    }
}

pub fn within_thresholds(process: &ProcessReport, holocron: &HolocronReport, thresholds: &Thresholds) -> bool {
    process.cpu <= thresholds.max_cpu_percent
        && process.memory <= thresholds.max_memory_bytes
        && process.tick_delay < thresholds.max_tick_delay
        && holocron.root_module_exists
}

pub fn classify(process: &ProcessReport, holocron: &HolocronReport, thresholds: &Thresholds) -> HealthStatus {
    if !holocron.module_map_healthy {
        HealthStatus::Partial
    } else if within_thresholds(process, holocron, thresholds) {
        HealthStatus::Ok
    } else {
        HealthStatus::Degraded
    }
}

fn hrtime<S: Serializer>(delay: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    (delay.as_secs(), delay.subsec_nanos()).serialize(serializer)
}
