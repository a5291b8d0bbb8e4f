//! Process-level metrics: CPU, resident memory and scheduler delay.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::error::SampleError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessStats {
    /// Percent of one core.
    pub cpu: f64,
    /// Resident set size in bytes.
    pub memory: u64,
}

/// Source of process statistics.
#[async_trait]
pub trait ProcessProbe: Send + Sync {
    async fn stats(&self) -> Result<ProcessStats, SampleError>;
}

/// Reads the current process through `sysinfo`.
///
/// The `System` is kept between samples; CPU usage is the delta since the
/// previous refresh, so the very first sample reports 0.
pub struct SysinfoProbe {
    pid: Pid,
    system: Arc<Mutex<System>>,
}

impl SysinfoProbe {
    pub fn new() -> Result<Self, SampleError> {
        let pid = sysinfo::get_current_pid().map_err(|e| SampleError::Pid(e.to_string()))?;
        Ok(Self {
            pid,
            system: Arc::new(Mutex::new(System::new())),
        })
    }
}

#[async_trait]
impl ProcessProbe for SysinfoProbe {
    async fn stats(&self) -> Result<ProcessStats, SampleError> {
        let pid = self.pid;
        let system = Arc::clone(&self.system);

        tokio::task::spawn_blocking(move || {
            let mut sys = system.lock().unwrap_or_else(|p| p.into_inner());
            sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
            sys.process(pid)
                .map(|process| ProcessStats {
                    cpu: f64::from(process.cpu_usage()),
                    memory: process.memory(),
                })
                .ok_or(SampleError::ProcessNotFound(pid.as_u32()))
        })
        .await?
    }
}

/// Time between yielding to the scheduler and being polled again.
///
/// Measures queueing in the runtime rather than raw CPU load.
pub async fn tick_delay() -> Duration {
    let start = Instant::now();
    tokio::task::yield_now().await;
    start.elapsed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn samples_current_process() {
        let probe = SysinfoProbe::new().unwrap();
        let stats = probe.stats().await.unwrap();
        assert!(stats.memory > 0);
        assert!(stats.cpu >= 0.0);
    }

    #[tokio::test]
    async fn idle_runtime_has_small_tick_delay() {
        let delay = tick_delay().await;
        assert!(delay < Duration::from_secs(1));
    }
}
