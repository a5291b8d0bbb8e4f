//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenRequest (context label, port, tls?)
//!     → listener.rs (resolve host, decide TLS)
//!     → tls.rs (load key/cert/ca/passphrase when TLS requested)
//!     → handle.rs (server's listen contract)
//!     → lifecycle::registry (tracked for shutdown)
//! ```
//!
//! # Design Decisions
//! - TLS path checks happen before any filesystem or socket call
//! - The listen contract always receives an explicit TLS-or-none value
//! - Binding failures are reported, never acted on, at this layer

pub mod handle;
pub mod listener;
pub mod tls;

pub use handle::{ListenOptions, ServerHandle};
pub use listener::{ListenRequest, ListenerBinder};
pub use tls::{TlsDescriptor, TlsMaterial};
