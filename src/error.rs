//! Error taxonomy for the server lifecycle.
//!
//! # Categories
//! - `ConfigError`: missing or invalid configuration (fatal, no retry)
//! - `ListenError`: TLS material or bind failures (fatal, triggers shutdown)
//! - `SampleError`: health metric collection (contained in the sampler)
//! - `CloseError`: one or more servers failed to close (logged, non-blocking)
//! - `StartupError`: a failed startup stage, wrapping one of the above

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::config::validation::ValidationError;
use crate::lifecycle::startup::Stage;

/// Message used when TLS is requested without key and certificate paths.
pub const MISSING_TLS_PATHS: &str = "HTTPS requires private key and certificate chain paths";

/// Configuration errors. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{}", MISSING_TLS_PATHS)]
    MissingTlsPaths,

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

/// Errors surfaced by the listener binder.
#[derive(Debug, thiserror::Error)]
pub enum ListenError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read TLS material {path}: {source}")]
    Material {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{context} failed to bind: {source}")]
    Bind {
        context: String,
        #[source]
        source: io::Error,
    },
}

/// Health sampling failures. Never fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("process {0} not found")]
    ProcessNotFound(u32),

    #[error("unable to determine current pid: {0}")]
    Pid(String),

    #[error("metrics collection task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Aggregate of every server that failed to close during shutdown.
#[derive(Debug, thiserror::Error)]
#[error("{} server(s) failed to close: {}", .failures.len(), describe_failures(.failures))]
pub struct CloseError {
    pub failures: Vec<(String, io::Error)>,
}

/// Module map loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ModuleMapError {
    #[error("failed to fetch module map from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read module map {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed module map: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure of a single startup stage.
#[derive(Debug, thiserror::Error)]
#[error("startup failed at {stage}: {source}")]
pub struct StartupError {
    pub stage: Stage,
    #[source]
    pub source: StageError,
}

/// What went wrong inside a startup stage.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Build(io::Error),

    #[error(transparent)]
    Listen(#[from] ListenError),

    #[error(transparent)]
    ModuleMap(#[from] ModuleMapError),

    #[error("file watcher: {0}")]
    Watch(#[from] notify::Error),
}

impl StartupError {
    pub fn new(stage: Stage, source: impl Into<StageError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_failures(failures: &[(String, io::Error)]) -> String {
    failures
        .iter()
        .map(|(name, err)| format!("{name}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tls_paths_message_is_exact() {
        let err = ConfigError::MissingTlsPaths;
        assert_eq!(err.to_string(), MISSING_TLS_PATHS);
    }

    #[test]
    fn close_error_lists_every_server() {
        let err = CloseError {
            failures: vec![
                ("metrics".into(), io::Error::other("stuck")),
                ("cdn".into(), io::Error::other("gone")),
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("2 server(s) failed to close"));
        assert!(msg.contains("metrics: stuck"));
        assert!(msg.contains("cdn: gone"));
    }
}
