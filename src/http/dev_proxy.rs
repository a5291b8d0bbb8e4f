//! Development proxy.
//!
//! Requests whose first path segment matches a remote's `devProxyPath` are
//! forwarded to that remote's destination with the prefix stripped;
//! everything else goes to the local app server.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// One entry of the dev endpoints file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DevEndpoint {
    pub destination: String,
    pub dev_proxy_path: String,
}

/// Path prefix → destination base URL.
pub type Remotes = BTreeMap<String, String>;

/// Read remotes from the endpoints file; a missing file means no remotes.
pub fn load_remotes(path: &Path) -> std::io::Result<Remotes> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Remotes::new()),
        Err(e) => return Err(e),
    };
    let endpoints: BTreeMap<String, DevEndpoint> = serde_json::from_slice(&bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    Ok(endpoints
        .into_values()
        .map(|e| (e.dev_proxy_path.trim_matches('/').to_string(), e.destination))
        .collect())
}

#[derive(Clone)]
struct ProxyState {
    remotes: Arc<Remotes>,
    app_origin: Arc<str>,
    client: Client<HttpConnector, Body>,
}

pub fn router(remotes: Remotes, app_origin: impl Into<String>) -> Router {
    let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
    let state = ProxyState {
        remotes: Arc::new(remotes),
        app_origin: Arc::from(app_origin.into()),
        client,
    };

    Router::new()
        .fallback(proxy_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Where a request path should be forwarded.
///
/// The longest `devProxyPath` that matches whole leading segments wins.
pub fn resolve_target(remotes: &Remotes, app_origin: &str, path_and_query: &str) -> String {
    let trimmed = path_and_query.trim_start_matches('/');

    let matched = remotes
        .iter()
        .filter(|(prefix, _)| !prefix.is_empty() && matches_prefix(trimmed, prefix))
        .max_by_key(|(prefix, _)| prefix.len());

    match matched {
        Some((prefix, destination)) => {
            let rest = &trimmed[prefix.len()..];
            format!("{}{}", destination.trim_end_matches('/'), rest)
        }
        None => format!("{}{}", app_origin.trim_end_matches('/'), path_and_query),
    }
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?']))
}

async fn proxy_handler(State(state): State<ProxyState>, request: Request<Body>) -> Response {
    let (mut parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let target = resolve_target(&state.remotes, &state.app_origin, &path_and_query);
    let uri: Uri = match target.parse() {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(upstream = %target, error = %e, "Invalid proxy target");
            return (StatusCode::BAD_GATEWAY, "Invalid proxy target").into_response();
        }
    };

    parts.uri = uri;
    parts.headers.remove(axum::http::header::HOST);

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(upstream = %target, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
