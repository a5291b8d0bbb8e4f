//! The contract every listener-bearing server implements.

use std::io;

use async_trait::async_trait;

use crate::net::tls::TlsDescriptor;

/// Arguments handed to [`ServerHandle::listen`].
///
/// `tls` is always present: `None` is the explicit "no TLS" marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenOptions {
    pub host: String,
    pub port: u16,
    pub tls: Option<TlsDescriptor>,
}

/// A server that can be bound once and closed later.
///
/// Implementations must make `close` safe to call more than once and on a
/// server that never started listening.
#[async_trait]
pub trait ServerHandle: Send + Sync {
    /// Human readable name used in logs and close reports.
    fn name(&self) -> &str;

    /// Bind the socket and begin accepting connections.
    async fn listen(&self, options: ListenOptions) -> io::Result<()>;

    /// Stop accepting connections and wait for the server to wind down.
    async fn close(&self) -> io::Result<()>;
}
