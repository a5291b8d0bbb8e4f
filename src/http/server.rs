//! Axum-backed implementation of the server handle contract.
//!
//! # Responsibilities
//! - Bind the listener (plain or rustls) at listen time
//! - Serve the router on a background task
//! - Graceful close that waits for in-flight requests
//!
//! # Design Decisions
//! - The socket is bound before `listen` returns so bind errors surface to
//!   the caller instead of inside the serve task
//! - TLS material is parsed before binding; bad material never opens a port

use std::io;
use std::net::SocketAddr;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use axum_server::Handle;
use tokio::task::JoinHandle;

use crate::net::handle::{ListenOptions, ServerHandle};
use crate::net::tls::rustls_config;

/// An axum router that can be bound and closed through [`ServerHandle`].
pub struct HttpServer {
    name: String,
    router: Router,
    handle: Handle,
    task: tokio::sync::Mutex<Option<JoinHandle<io::Result<()>>>>,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl HttpServer {
    pub fn new(name: impl Into<String>, router: Router) -> Self {
        Self {
            name: name.into(),
            router,
            handle: Handle::new(),
            task: tokio::sync::Mutex::new(None),
            local_addr: Mutex::new(None),
        }
    }

    /// Address the server is bound to, once listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl ServerHandle for HttpServer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn listen(&self, options: ListenOptions) -> io::Result<()> {
        let mut task = self.task.lock().await;
        if task.is_some() {
            return Err(io::Error::new(io::ErrorKind::AlreadyExists, "server is already listening"));
        }

        let tls = options.tls.as_ref().map(rustls_config).transpose()?;

        let listener = tokio::net::TcpListener::bind((options.host.as_str(), options.port))
            .await?
            .into_std()?;
        let addr = listener.local_addr()?;

        let app = self.router.clone().into_make_service();
        let handle = self.handle.clone();
        let join = match tls {
            Some(config) => tokio::spawn(
                axum_server::tls_rustls::from_tcp_rustls(listener, config)
                    .handle(handle)
                    .serve(app),
            ),
            None => tokio::spawn(axum_server::from_tcp(listener).handle(handle).serve(app)),
        };

        *task = Some(join);
        *self.local_addr.lock().unwrap_or_else(|p| p.into_inner()) = Some(addr);

        tracing::debug!(server = %self.name, address = %addr, tls = options.tls.is_some(), "Listener bound");
        Ok(())
    }

    async fn close(&self) -> io::Result<()> {
        let Some(task) = self.task.lock().await.take() else {
            return Ok(());
        };

        self.handle.graceful_shutdown(None);
        let result = task.await.map_err(io::Error::other)?;

        tracing::info!(server = %self.name, "HTTP server stopped");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    fn options(port: u16) -> ListenOptions {
        ListenOptions {
            host: "127.0.0.1".into(),
            port,
            tls: None,
        }
    }

    #[tokio::test]
    async fn serves_and_closes() {
        let server = HttpServer::new("test", Router::new().route("/", get(|| async { "hello" })));
        server.listen(options(0)).await.unwrap();
        let addr = server.local_addr().unwrap();

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let body = client.get(format!("http://{addr}/")).send().await.unwrap().text().await.unwrap();
        assert_eq!(body, "hello");

        server.close().await.unwrap();
        let fresh = reqwest::Client::builder().no_proxy().build().unwrap();
        assert!(fresh.get(format!("http://{addr}/")).send().await.is_err());
    }

    #[tokio::test]
    async fn close_before_listen_and_twice_is_ok() {
        let server = HttpServer::new("test", Router::new());
        server.close().await.unwrap();

        server.listen(options(0)).await.unwrap();
        server.close().await.unwrap();
        server.close().await.unwrap();
    }

    #[tokio::test]
    async fn port_in_use_fails_to_listen() {
        let first = HttpServer::new("first", Router::new());
        first.listen(options(0)).await.unwrap();
        let port = first.local_addr().unwrap().port();

        let second = HttpServer::new("second", Router::new());
        let err = second.listen(options(port)).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
        assert!(second.local_addr().is_none());

        first.close().await.unwrap();
    }
}
