//! Process-wide set of started servers.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::CloseError;
use crate::net::handle::ServerHandle;

/// Tracks every server whose listener bound successfully.
///
/// Owned by the startup orchestrator and shared with the shutdown
/// coordinator. `add` must not race with `close_all`; shutdown is terminal.
#[derive(Default)]
pub struct ServerRegistry {
    servers: Mutex<Vec<Arc<dyn ServerHandle>>>,
}

impl ServerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a server that has just started listening.
    pub fn add(&self, server: Arc<dyn ServerHandle>) {
        tracing::debug!(server = server.name(), "Server registered");
        self.lock().push(server);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Names of the tracked servers.
    pub fn names(&self) -> Vec<String> {
        self.lock().iter().map(|s| s.name().to_string()).collect()
    }

    /// Close and forget every tracked server.
    ///
    /// Every server gets a close attempt even when an earlier one fails; the
    /// failures come back together. A second call finds the set empty and
    /// succeeds without touching anything.
    pub async fn close_all(&self) -> Result<(), CloseError> {
        let servers = std::mem::take(&mut *self.lock());
        let mut failures = Vec::new();

        for server in servers {
            match server.close().await {
                Ok(()) => tracing::debug!(server = server.name(), "Server closed"),
                Err(e) => {
                    tracing::warn!(server = server.name(), error = %e, "Server failed to close");
                    failures.push((server.name().to_string(), e));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(CloseError { failures })
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn ServerHandle>>> {
        // The guarded Vec stays consistent even if a holder panicked.
        self.servers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
