//! Startup orchestration.
//!
//! # Sequence
//! ```text
//! development:  dev CDN → dev proxy ─┐
//!                                    ▼
//! always:       load modules → app server → module map polling → metrics server (if a port is set)
//!                                    │
//! development:                       └─▶ local module watcher
//! ```
//!
//! # Design Decisions
//! - Fail fast: any stage error aborts the rest of the chain
//! - Stages run strictly in order, never concurrently
//! - Failures are handed to the shutdown coordinator; nothing is retried

use std::fmt;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::config::ServerConfig;
use crate::config::validation::ValidationError;
use crate::error::{ConfigError, ListenError, ModuleMapError, StageError, StartupError};
use crate::lifecycle::registry::ServerRegistry;
use crate::lifecycle::shutdown::{ShutdownCoordinator, ShutdownOutcome, ShutdownReason};
use crate::lifecycle::signals::wait_for_shutdown_signal;
use crate::net::handle::{ListenOptions, ServerHandle};
use crate::net::listener::{ListenRequest, ListenerBinder};

pub const APP_SERVER: &str = "App server";
pub const METRICS_SERVER: &str = "Metrics server";
pub const DEV_CDN_SERVER: &str = "Dev CDN server";
pub const DEV_PROXY_SERVER: &str = "Dev proxy server";

/// One step of the startup chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    DevCdn,
    DevProxy,
    LoadModules,
    AppServer,
    ModuleMapPolling,
    MetricsServer,
    LocalModuleWatch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::DevCdn => "dev cdn",
            Stage::DevProxy => "dev proxy",
            Stage::LoadModules => "load modules",
            Stage::AppServer => "app server",
            Stage::ModuleMapPolling => "module map polling",
            Stage::MetricsServer => "metrics server",
            Stage::LocalModuleWatch => "local module watch",
        };
        f.write_str(name)
    }
}

/// Builds the servers and background work the orchestrator sequences.
#[async_trait]
pub trait ServerFactory: Send + Sync {
    async fn app_server(&self) -> io::Result<Arc<dyn ServerHandle>>;

    async fn metrics_server(&self) -> io::Result<Arc<dyn ServerHandle>>;

    async fn dev_cdn_server(&self) -> io::Result<Arc<dyn ServerHandle>>;

    async fn dev_proxy_server(&self) -> io::Result<Arc<dyn ServerHandle>>;

    /// Initial module load, before the app server binds.
    async fn load_modules(&self) -> Result<(), ModuleMapError> {
        Ok(())
    }

    /// Start refreshing the module map in the background.
    fn poll_module_map(&self, _shutdown: broadcast::Receiver<()>) {}

    /// Start watching locally built modules (development only).
    fn watch_local_modules(&self, _shutdown: broadcast::Receiver<()>) -> Result<(), notify::Error> {
        Ok(())
    }
}

/// Sequences server startup and routes failures to shutdown.
pub struct StartupOrchestrator<F> {
    config: Arc<ServerConfig>,
    factory: F,
    binder: ListenerBinder,
    coordinator: Arc<ShutdownCoordinator>,
}

impl<F: ServerFactory> StartupOrchestrator<F> {
    pub fn new(config: Arc<ServerConfig>, factory: F) -> Self {
        let registry = Arc::new(ServerRegistry::new());
        let binder = ListenerBinder::new(&config.listener, config.tls.clone(), Arc::clone(&registry));
        Self::with_binder(config, factory, binder)
    }

    /// Use a preconfigured binder; its registry becomes the shutdown set.
    pub fn with_binder(config: Arc<ServerConfig>, factory: F, binder: ListenerBinder) -> Self {
        let coordinator = Arc::new(ShutdownCoordinator::new(Arc::clone(binder.registry())));
        Self {
            config,
            factory,
            binder,
            coordinator,
        }
    }

    pub fn coordinator(&self) -> &Arc<ShutdownCoordinator> {
        &self.coordinator
    }

    pub fn registry(&self) -> &Arc<ServerRegistry> {
        self.binder.registry()
    }

    /// The stages [`start`](Self::start) will run, in order.
    pub fn plan(&self) -> Vec<Stage> {
        let mut stages = Vec::new();
        if self.config.is_development() {
            stages.extend([Stage::DevCdn, Stage::DevProxy]);
        }
        stages.extend([Stage::LoadModules, Stage::AppServer, Stage::ModuleMapPolling]);
        if self.config.metrics_port.is_some() {
            stages.push(Stage::MetricsServer);
        }
        if self.config.is_development() {
            stages.push(Stage::LocalModuleWatch);
        }
        stages
    }

    /// Run every stage in order, stopping at the first failure.
    pub async fn start(&self) -> Result<(), StartupError> {
        for stage in self.plan() {
            tracing::debug!(%stage, "Starting stage");
            self.run_stage(stage)
                .await
                .map_err(|source| StartupError::new(stage, source))?;
        }
        tracing::info!(servers = ?self.registry().names(), "Startup complete");
        Ok(())
    }

    /// Start, shutting everything down if any stage fails.
    pub async fn launch(&self) -> Result<(), ShutdownOutcome> {
        match self.start().await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(stage = %e.stage, error = %e.source, "Startup failed");
                Err(self.coordinator.shutdown(ShutdownReason::Fatal(e.to_string())).await)
            }
        }
    }

    /// Start, serve until a termination signal, then shut down.
    /// Returns the process exit code.
    pub async fn run(self) -> i32 {
        if let Err(outcome) = self.launch().await {
            return outcome.exit_code;
        }

        let reason = match wait_for_shutdown_signal().await {
            Ok(()) => ShutdownReason::Signal,
            Err(e) => ShutdownReason::Fatal(format!("signal handler registration failed: {e}")),
        };
        self.coordinator.shutdown(reason).await.exit_code
    }

    async fn run_stage(&self, stage: Stage) -> Result<(), StageError> {
        match stage {
            Stage::DevCdn => {
                let server = self.factory.dev_cdn_server().await.map_err(StageError::Build)?;
                let port = required_port(DEV_CDN_SERVER, self.config.dev.cdn_port)?;
                self.binder.listen(server, ListenRequest::plain(DEV_CDN_SERVER, port)).await?;
            }
            Stage::DevProxy => self.start_dev_proxy().await?,
            Stage::LoadModules => self.factory.load_modules().await?,
            Stage::AppServer => {
                let server = self.factory.app_server().await.map_err(StageError::Build)?;
                let port = required_port(APP_SERVER, self.config.primary_port())?;
                let request = if self.config.primary_uses_tls() {
                    ListenRequest::secure(APP_SERVER, port)
                } else {
                    ListenRequest::plain(APP_SERVER, port)
                };
                self.binder.listen(server, request).await?;
            }
            Stage::ModuleMapPolling => self.factory.poll_module_map(self.coordinator.subscribe()),
            Stage::MetricsServer => {
                let server = self.factory.metrics_server().await.map_err(StageError::Build)?;
                let port = required_port(METRICS_SERVER, self.config.metrics_port)?;
                self.binder.listen(server, ListenRequest::plain(METRICS_SERVER, port)).await?;
            }
            Stage::LocalModuleWatch => self
                .factory
                .watch_local_modules(self.coordinator.subscribe())?,
        }
        Ok(())
    }

    /// The dev proxy owns its listen call, so it bypasses the binder.
    async fn start_dev_proxy(&self) -> Result<(), StageError> {
        let server = self.factory.dev_proxy_server().await.map_err(StageError::Build)?;
        let port = required_port(DEV_PROXY_SERVER, self.config.dev.proxy_port)?;
        let options = ListenOptions {
            host: self.binder.host().to_string(),
            port,
            tls: None,
        };

        match server.listen(options).await {
            Ok(()) => {
                tracing::info!(context = DEV_PROXY_SERVER, port, "{} listening on port {}", DEV_PROXY_SERVER, port);
                self.registry().add(server);
                Ok(())
            }
            Err(source) => {
                tracing::error!(context = DEV_PROXY_SERVER, error = %source, "Error encountered starting {} server", DEV_PROXY_SERVER);
                Err(ListenError::Bind {
                    context: DEV_PROXY_SERVER.to_string(),
                    source,
                }
                .into())
            }
        }
    }
}

fn required_port(server: &'static str, port: Option<u16>) -> Result<u16, ListenError> {
    port.ok_or_else(|| ConfigError::Validation(vec![ValidationError::MissingPort(server)]).into())
}
