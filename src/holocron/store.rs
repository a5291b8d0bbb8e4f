//! In-memory module state shared with the health sampler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::holocron::module_map::ModuleMap;

/// Read-only view of application module state.
pub trait ModuleState: Send + Sync {
    fn is_module_loaded(&self, name: &str) -> bool;

    /// Whether the most recent module map refresh succeeded.
    fn is_module_map_healthy(&self) -> bool;
}

/// Current module map plus its freshness flag.
pub struct ModuleStore {
    map: ArcSwap<ModuleMap>,
    healthy: AtomicBool,
}

impl ModuleStore {
    /// Empty and not yet fresh.
    pub fn new() -> Self {
        Self {
            map: ArcSwap::from_pointee(ModuleMap::default()),
            healthy: AtomicBool::new(false),
        }
    }

    /// Swap in a freshly loaded map. Returns whether its key changed.
    pub fn replace(&self, map: ModuleMap) -> bool {
        let changed = self.map.load().key != map.key;
        self.map.store(Arc::new(map));
        self.healthy.store(true, Ordering::SeqCst);
        changed
    }

    /// Keep the current map but report it stale.
    pub fn mark_stale(&self) {
        self.healthy.store(false, Ordering::SeqCst);
    }

    /// Accept the current map as authoritative without a refresh.
    pub fn mark_fresh(&self) {
        self.healthy.store(true, Ordering::SeqCst);
    }
}

impl Default for ModuleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleState for ModuleStore {
    fn is_module_loaded(&self, name: &str) -> bool {
        self.map.load().contains(name)
    }

    fn is_module_map_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}
