//! Application server lifecycle and health supervision.

pub mod config;
pub mod error;
pub mod health;
pub mod holocron;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;

pub use config::ServerConfig;
pub use health::{HealthReport, HealthSampler, HealthStatus};
pub use http::{HttpServer, StandardServers};
pub use lifecycle::{ShutdownCoordinator, StartupOrchestrator};
pub use net::ServerHandle;
