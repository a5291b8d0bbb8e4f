//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Build server → net::ListenerBinder → registry.rs (add)
//!     Any stage fails → shutdown.rs
//!
//! Shutdown (shutdown.rs):
//!     Signal or fatal error → notify subscribers → registry.close_all() → exit code
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT/SIGQUIT → graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: dev servers, then app server, then metrics
//! - The registry is owned by the orchestrator, not a process global
//! - No timeout around close; a hung server blocks termination

pub mod registry;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use registry::ServerRegistry;
pub use shutdown::{ShutdownCoordinator, ShutdownOutcome, ShutdownReason, ShutdownState};
pub use startup::{ServerFactory, Stage, StartupOrchestrator};
