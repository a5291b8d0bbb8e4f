//! Production server factory.
//!
//! Wires the concrete routers, the module store and the module map
//! background tasks into the [`ServerFactory`] the orchestrator drives.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::broadcast;

use crate::config::ServerConfig;
use crate::error::ModuleMapError;
use crate::health::HealthSampler;
use crate::holocron::{LocalModuleWatcher, ModuleMapPoller, ModuleMapSource, ModuleStore};
use crate::http::server::HttpServer;
use crate::http::{app, dev_cdn, dev_proxy, metrics_server};
use crate::lifecycle::startup::{
    ServerFactory, APP_SERVER, DEV_CDN_SERVER, DEV_PROXY_SERVER, METRICS_SERVER,
};
use crate::net::handle::ServerHandle;

pub struct StandardServers {
    config: Arc<ServerConfig>,
    sampler: Arc<HealthSampler>,
    store: Arc<ModuleStore>,
    prometheus: PrometheusHandle,
}

impl StandardServers {
    pub fn new(
        config: Arc<ServerConfig>,
        sampler: Arc<HealthSampler>,
        store: Arc<ModuleStore>,
        prometheus: PrometheusHandle,
    ) -> Self {
        Self {
            config,
            sampler,
            store,
            prometheus,
        }
    }

    /// Remote URL if configured, otherwise the local map in development.
    fn module_map_source(&self) -> Result<Option<ModuleMapSource>, ModuleMapError> {
        let module_map = &self.config.module_map;
        match &module_map.url {
            Some(url) => Ok(Some(ModuleMapSource::remote(
                url.clone(),
                Duration::from_secs(module_map.fetch_timeout_secs),
            )?)),
            None if self.config.is_development() => {
                Ok(Some(ModuleMapSource::local(&self.config.dev.local_module_map_path)))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ServerFactory for StandardServers {
    async fn app_server(&self) -> io::Result<Arc<dyn ServerHandle>> {
        let router = app::router(Arc::clone(&self.sampler));
        Ok(Arc::new(HttpServer::new(APP_SERVER, router)))
    }

    async fn metrics_server(&self) -> io::Result<Arc<dyn ServerHandle>> {
        let router = metrics_server::router(Arc::clone(&self.sampler), self.prometheus.clone());
        Ok(Arc::new(HttpServer::new(METRICS_SERVER, router)))
    }

    async fn dev_cdn_server(&self) -> io::Result<Arc<dyn ServerHandle>> {
        let router = dev_cdn::router(&self.config.dev.static_dir);
        Ok(Arc::new(HttpServer::new(DEV_CDN_SERVER, router)))
    }

    async fn dev_proxy_server(&self) -> io::Result<Arc<dyn ServerHandle>> {
        let remotes = dev_proxy::load_remotes(&self.config.dev.endpoints_path)?;
        let app_port = self.config.primary_port().unwrap_or_default();
        tracing::debug!(remotes = remotes.len(), app_port, "Dev proxy remotes loaded");

        let router = dev_proxy::router(remotes, format!("http://127.0.0.1:{app_port}"));
        Ok(Arc::new(HttpServer::new(DEV_PROXY_SERVER, router)))
    }

    async fn load_modules(&self) -> Result<(), ModuleMapError> {
        match self.module_map_source()? {
            Some(source) => {
                let map = source.fetch().await?;
                tracing::info!(key = %map.key, modules = map.modules.len(), "Modules loaded");
                self.store.replace(map);
            }
            None => {
                tracing::info!("No module map source configured");
                self.store.mark_fresh();
            }
        }
        Ok(())
    }

    fn poll_module_map(&self, shutdown: broadcast::Receiver<()>) {
        let source = match self.module_map_source() {
            Ok(Some(source)) => source,
            Ok(None) => return,
            Err(e) => {
                tracing::error!(error = %e, "Module map polling disabled");
                self.store.mark_stale();
                return;
            }
        };

        let module_map = &self.config.module_map;
        let poller = ModuleMapPoller::new(
            source,
            Arc::clone(&self.store),
            Duration::from_millis(module_map.poll_min_ms),
            Duration::from_millis(module_map.poll_max_ms),
        );
        tokio::spawn(poller.run(shutdown));
    }

    fn watch_local_modules(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), notify::Error> {
        let watcher =
            LocalModuleWatcher::new(&self.config.dev.local_module_map_path, Arc::clone(&self.store)).run()?;

        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            drop(watcher);
            tracing::info!("Local module watcher stopped");
        });
        Ok(())
    }
}
