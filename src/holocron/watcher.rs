//! Local module map watcher for development.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::holocron::module_map::ModuleMap;
use crate::holocron::store::ModuleStore;

/// Reloads the module store whenever the local module map file changes.
pub struct LocalModuleWatcher {
    path: PathBuf,
    store: Arc<ModuleStore>,
}

impl LocalModuleWatcher {
    pub fn new(path: &Path, store: Arc<ModuleStore>) -> Self {
        Self {
            path: path.to_path_buf(),
            store,
        }
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();
        let store = Arc::clone(&self.store);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = ?path, "Local module map changed, reloading");
                        reload(&path, &store);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Local module watcher started");
        Ok(watcher)
    }
}

/// Read the map from disk into the store; failures mark the store stale.
pub fn reload(path: &Path, store: &ModuleStore) {
    let result = std::fs::read(path)
        .map_err(|e| e.to_string())
        .and_then(|bytes| ModuleMap::from_slice(&bytes).map_err(|e| e.to_string()));

    match result {
        Ok(map) => {
            store.replace(map);
        }
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Failed to reload local module map");
            store.mark_stale();
        }
    }
}
