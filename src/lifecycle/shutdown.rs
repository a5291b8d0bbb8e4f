//! Shutdown coordination for the server process.
//!
//! ```text
//! Running ──(signal | fatal error)──▶ ShuttingDown ──(close_all)──▶ Terminated(code)
//! ```
//!
//! There is no way back to `Running`. Calling [`ShutdownCoordinator::shutdown`]
//! again after termination returns the first outcome without closing anything.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use crate::lifecycle::registry::ServerRegistry;

/// Why the process is shutting down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// An OS signal or an orderly stop.
    Signal,
    /// A fatal error, e.g. a failed startup stage.
    Fatal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    ShuttingDown,
    Terminated(i32),
}

/// Result of a shutdown, including the exit code the process should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownOutcome {
    pub exit_code: i32,
    /// Servers that failed to close.
    pub close_failures: Vec<String>,
}

/// Coordinator for process shutdown.
///
/// Owns a reference to the server registry and a broadcast channel that
/// long-running background tasks subscribe to.
pub struct ShutdownCoordinator {
    registry: Arc<ServerRegistry>,
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
    state: Mutex<ShutdownState>,
}

impl ShutdownCoordinator {
    pub fn new(registry: Arc<ServerRegistry>) -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            registry,
            tx,
            state: Mutex::new(ShutdownState::Running),
        }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> ShutdownState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn registry(&self) -> &Arc<ServerRegistry> {
        &self.registry
    }

    /// Notify subscribers, close every registered server, and report the
    /// exit code. Non-zero when `reason` is fatal or any server failed to close.
    pub async fn shutdown(&self, reason: ShutdownReason) -> ShutdownOutcome {
        {
            let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
            match *state {
                ShutdownState::Running => *state = ShutdownState::ShuttingDown,
                ShutdownState::ShuttingDown => {
                    tracing::debug!("Shutdown already in progress");
                    return ShutdownOutcome { exit_code: 0, close_failures: Vec::new() };
                }
                ShutdownState::Terminated(exit_code) => {
                    tracing::debug!(exit_code, "Shutdown already complete");
                    return ShutdownOutcome { exit_code, close_failures: Vec::new() };
                }
            }
        }

        match &reason {
            ShutdownReason::Signal => tracing::info!("Shutting down"),
            ShutdownReason::Fatal(error) => tracing::error!(error = %error, "Shutting down after fatal error"),
        }

        let _ = self.tx.send(());

        let close_failures = match self.registry.close_all().await {
            Ok(()) => Vec::new(),
            Err(e) => {
                tracing::error!(error = %e, "Some servers failed to close");
                e.failures.into_iter().map(|(name, _)| name).collect()
            }
        };

        let exit_code = match reason {
            ShutdownReason::Signal if close_failures.is_empty() => 0,
            _ => 1,
        };

        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = ShutdownState::Terminated(exit_code);
        tracing::info!(exit_code, "Shutdown complete");

        ShutdownOutcome { exit_code, close_failures }
    }
}
