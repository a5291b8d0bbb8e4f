//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (overlay environment-style variables)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is built once at process start and never mutated afterwards
//! - All fields have defaults to allow minimal configs
//! - Environment lookups are injected so nothing reads process globals
//!   below `main`

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{
    DevConfig, HealthConfig, ListenerConfig, LogFormat, LoggingConfig, ModuleMapConfig, RunMode,
    ServerConfig, TlsPaths,
};
