//! Health reporting subsystem.
//!
//! # Data Flow
//! ```text
//! GET /im-up
//!     → sampler.rs
//!         ├─ process.rs (cpu, memory)   ┐ collected
//!         ├─ process.rs (tick delay)    ┘ concurrently
//!         └─ holocron store (root module present, module map fresh)
//!     → report.rs (classify: 207 / 200 / 503)
//!     → structured body, transport status mirrors report status
//! ```
//!
//! # Design Decisions
//! - Every request samples fresh; nothing is cached
//! - Classification is a pure function of the two sub-reports
//! - Sampling failures become a bare 500; they never reach the process

pub mod process;
pub mod report;
pub mod sampler;

pub use process::{ProcessProbe, ProcessStats, SysinfoProbe};
pub use report::{classify, HealthReport, HealthStatus, HolocronReport, ProcessReport, Thresholds};
pub use sampler::{HealthCheck, HealthSampler};
