//! Periodic module map refresh.
//!
//! # Cadence
//! - Map changed: poll again after the minimum interval
//! - Map unchanged: stretch the interval by 25%, up to the maximum
//! - Refresh failed: mark the map stale and back off exponentially

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::error::ModuleMapError;
use crate::holocron::module_map::ModuleMapSource;
use crate::holocron::store::ModuleStore;
use crate::resilience::backoff::calculate_backoff;

/// What a single poll observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Changed,
    Unchanged,
    Failed,
}

pub struct ModuleMapPoller {
    source: ModuleMapSource,
    store: Arc<ModuleStore>,
    min_interval: Duration,
    max_interval: Duration,
}

impl ModuleMapPoller {
    pub fn new(
        source: ModuleMapSource,
        store: Arc<ModuleStore>,
        min_interval: Duration,
        max_interval: Duration,
    ) -> Self {
        Self {
            source,
            store,
            min_interval,
            max_interval,
        }
    }

    /// Fetch once and apply the result to the store.
    pub async fn poll_once(&self) -> Result<bool, ModuleMapError> {
        match self.source.fetch().await {
            Ok(map) => {
                let key = map.key.clone();
                let changed = self.store.replace(map);
                if changed {
                    tracing::info!(key = %key, source = %self.source.describe(), "Module map updated");
                }
                Ok(changed)
            }
            Err(e) => {
                self.store.mark_stale();
                Err(e)
            }
        }
    }

    /// Poll until the shutdown broadcast fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            source = %self.source.describe(),
            min_ms = self.min_interval.as_millis() as u64,
            max_ms = self.max_interval.as_millis() as u64,
            "Module map polling started"
        );

        let mut delay = self.min_interval;
        let mut failures = 0u32;

        loop {
            tokio::select! {
                _ = time::sleep(delay) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Module map poller received shutdown signal, exiting loop");
                    break;
                }
            }

            let outcome = match self.poll_once().await {
                Ok(true) => PollOutcome::Changed,
                Ok(false) => PollOutcome::Unchanged,
                Err(e) => {
                    tracing::warn!(error = %e, failures = failures + 1, "Module map refresh failed");
                    PollOutcome::Failed
                }
            };

            failures = if outcome == PollOutcome::Failed { failures.saturating_add(1) } else { 0 };
            delay = next_delay(outcome, delay, failures, self.min_interval, self.max_interval);
        }
    }
}

/// Interval before the next poll.
pub fn next_delay(outcome: PollOutcome, current: Duration, failures: u32, min: Duration, max: Duration) -> Duration {
    match outcome {
        PollOutcome::Changed => min,
        PollOutcome::Unchanged => current.mul_f64(1.25).clamp(min, max),
        PollOutcome::Failed => calculate_backoff(failures, min, max),
    }
}
