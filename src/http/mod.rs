//! HTTP servers.
//!
//! # Data Flow
//! ```text
//! factory.rs builds one HttpServer (server.rs) per role:
//!     App server      → app.rs (/im-up)
//!     Metrics server  → metrics_server.rs (/im-up, /metrics, 404)
//!     Dev CDN server  → dev_cdn.rs (/static)
//!     Dev proxy       → dev_proxy.rs (remotes, else app server)
//! ```

pub mod app;
pub mod dev_cdn;
pub mod dev_proxy;
pub mod factory;
pub mod health;
pub mod metrics_server;
pub mod server;

pub use factory::StandardServers;
pub use server::HttpServer;
