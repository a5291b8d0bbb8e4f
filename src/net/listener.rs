//! Listener binding for named servers.
//!
//! # Responsibilities
//! - Resolve the bind host (override or all interfaces)
//! - Load TLS material when the request asks for HTTPS
//! - Call the server's listen contract with an explicit TLS-or-none value
//! - Register successfully bound servers for coordinated shutdown
//!
//! The binder reports failures; it never shuts the process down itself.

use std::sync::Arc;

use crate::config::{ListenerConfig, TlsPaths};
use crate::error::ListenError;
use crate::lifecycle::registry::ServerRegistry;
use crate::net::handle::{ListenOptions, ServerHandle};
use crate::net::tls::{load_tls_material, FsSource, MaterialSource};

/// Address used when no host override is configured.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// A single listen attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenRequest {
    /// Label used in log lines, e.g. "App server".
    pub context: String,
    pub port: u16,
    pub tls: bool,
}

impl ListenRequest {
    pub fn plain(context: impl Into<String>, port: u16) -> Self {
        Self {
            context: context.into(),
            port,
            tls: false,
        }
    }

    pub fn secure(context: impl Into<String>, port: u16) -> Self {
        Self {
            context: context.into(),
            port,
            tls: true,
        }
    }
}

/// Binds servers and hands them to the registry.
pub struct ListenerBinder {
    host: String,
    tls_paths: TlsPaths,
    source: Arc<dyn MaterialSource>,
    registry: Arc<ServerRegistry>,
}

impl ListenerBinder {
    pub fn new(listener: &ListenerConfig, tls_paths: TlsPaths, registry: Arc<ServerRegistry>) -> Self {
        Self {
            host: resolve_host(listener.ip_address.as_deref()),
            tls_paths,
            source: Arc::new(FsSource),
            registry,
        }
    }

    /// Replace the filesystem as the source of TLS material.
    pub fn with_material_source(mut self, source: Arc<dyn MaterialSource>) -> Self {
        self.source = source;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn registry(&self) -> &Arc<ServerRegistry> {
        &self.registry
    }

    /// Bind `server` and register it.
    ///
    /// Any failure is logged with the request's context label and returned to
    /// the caller. Bind failures are wrapped in [`ListenError::Bind`] with
    /// that label; the underlying `io::Error` stays available as the source.
    pub async fn listen(
        &self,
        server: Arc<dyn ServerHandle>,
        request: ListenRequest,
    ) -> Result<Arc<dyn ServerHandle>, ListenError> {
        match self.bind(server.as_ref(), &request).await {
            Ok(()) => {
                tracing::info!(
                    context = %request.context,
                    port = request.port,
                    "{} listening on port {}",
                    request.context,
                    request.port
                );
                self.registry.add(Arc::clone(&server));
                Ok(server)
            }
            Err(error) => {
                tracing::error!(
                    context = %request.context,
                    error = %error,
                    "Error encountered starting {} server",
                    request.context
                );
                Err(error)
            }
        }
    }

    async fn bind(&self, server: &dyn ServerHandle, request: &ListenRequest) -> Result<(), ListenError> {
        let tls = if request.tls {
            Some(load_tls_material(&self.tls_paths, self.source.as_ref()).await?)
        } else {
            None
        };

        let options = ListenOptions {
            host: self.host.clone(),
            port: request.port,
            tls,
        };

        server.listen(options).await.map_err(|source| ListenError::Bind {
            context: request.context.clone(),
            source,
        })
    }
}

/// Use the override verbatim, or bind all interfaces.
pub fn resolve_host(ip_address: Option<&str>) -> String {
    ip_address.unwrap_or(DEFAULT_HOST).to_string()
}
