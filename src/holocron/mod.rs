//! Application module state.
//!
//! # Data Flow
//! ```text
//! startup: load_modules
//!     → module_map.rs (fetch remote URL or read local file)
//!     → store.rs (swap in new map, mark fresh)
//!
//! after the app server listens: poller.rs
//!     loop { fetch → store.replace | store.mark_stale → backoff }
//!
//! development: watcher.rs
//!     local module-map.json modified → reload → store.replace
//!
//! health sampler reads store.rs through `ModuleState`
//! ```
//!
//! # Design Decisions
//! - The map is swapped atomically; readers never see a half-applied update
//! - Freshness is a single flag owned by whoever last refreshed the map
//! - A failed refresh keeps serving the previous map but reports it stale

pub mod module_map;
pub mod poller;
pub mod store;
pub mod watcher;

pub use module_map::{ModuleBundle, ModuleEntry, ModuleMap, ModuleMapSource};
pub use poller::ModuleMapPoller;
pub use store::{ModuleState, ModuleStore};
pub use watcher::LocalModuleWatcher;
