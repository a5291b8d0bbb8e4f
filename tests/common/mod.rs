//! Shared fakes for lifecycle integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use app_server::error::ModuleMapError;
use app_server::lifecycle::ServerFactory;
use app_server::net::{ListenOptions, ServerHandle};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Ordered record of everything the fakes were asked to do.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// A server handle that records listen/close calls.
pub struct MockServer {
    name: String,
    fail_listen: bool,
    log: EventLog,
    pub listens: AtomicUsize,
    pub closes: AtomicUsize,
    pub last_options: Mutex<Option<ListenOptions>>,
}

impl MockServer {
    pub fn new(name: &str, fail_listen: bool, log: EventLog) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            fail_listen,
            log,
            listens: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            last_options: Mutex::new(None),
        })
    }

    pub fn listen_count(&self) -> usize {
        self.listens.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServerHandle for MockServer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn listen(&self, options: ListenOptions) -> io::Result<()> {
        self.listens.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options);
        self.log.push(format!("listen {}", self.name));
        if self.fail_listen {
            Err(io::Error::new(io::ErrorKind::AddrInUse, "address already in use"))
        } else {
            Ok(())
        }
    }

    async fn close(&self) -> io::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("close {}", self.name));
        Ok(())
    }
}

/// Which part of startup should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    None,
    DevCdn,
    DevProxy,
    LoadModules,
    App,
    Metrics,
}

/// A server factory handing out [`MockServer`]s.
pub struct ScriptedFactory {
    pub log: EventLog,
    pub app: Arc<MockServer>,
    pub metrics: Arc<MockServer>,
    pub dev_cdn: Arc<MockServer>,
    pub dev_proxy: Arc<MockServer>,
    fail_load: bool,
}

impl ScriptedFactory {
    pub fn new(failure: Failure) -> Self {
        let log = EventLog::default();
        Self {
            app: MockServer::new("App server", failure == Failure::App, log.clone()),
            metrics: MockServer::new("Metrics server", failure == Failure::Metrics, log.clone()),
            dev_cdn: MockServer::new("Dev CDN server", failure == Failure::DevCdn, log.clone()),
            dev_proxy: MockServer::new("Dev proxy server", failure == Failure::DevProxy, log.clone()),
            fail_load: failure == Failure::LoadModules,
            log,
        }
    }
}

#[async_trait]
impl ServerFactory for ScriptedFactory {
    async fn app_server(&self) -> io::Result<Arc<dyn ServerHandle>> {
        Ok(self.app.clone())
    }

    async fn metrics_server(&self) -> io::Result<Arc<dyn ServerHandle>> {
        Ok(self.metrics.clone())
    }

    async fn dev_cdn_server(&self) -> io::Result<Arc<dyn ServerHandle>> {
        Ok(self.dev_cdn.clone())
    }

    async fn dev_proxy_server(&self) -> io::Result<Arc<dyn ServerHandle>> {
        Ok(self.dev_proxy.clone())
    }

    async fn load_modules(&self) -> Result<(), ModuleMapError> {
        self.log.push("load modules");
        if self.fail_load {
            let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
            Err(ModuleMapError::Parse(err))
        } else {
            Ok(())
        }
    }

    fn poll_module_map(&self, _shutdown: broadcast::Receiver<()>) {
        self.log.push("poll module map");
    }

    fn watch_local_modules(&self, _shutdown: broadcast::Receiver<()>) -> Result<(), notify::Error> {
        self.log.push("watch local modules");
        Ok(())
    }
}
