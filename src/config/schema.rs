//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the application server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Production or development.
    pub mode: RunMode,

    /// Primary listener settings (ports, bind address).
    pub listener: ListenerConfig,

    /// TLS material locations. Only read when HTTPS is requested.
    pub tls: TlsPaths,

    /// Port for the metrics server.
    pub metrics_port: Option<u16>,

    /// Development-only servers.
    pub dev: DevConfig,

    /// Health thresholds and root module.
    pub health: HealthConfig,

    /// Module map source and polling cadence.
    pub module_map: ModuleMapConfig,

    /// Log output settings.
    pub logging: LoggingConfig,
}

impl ServerConfig {
    pub fn is_development(&self) -> bool {
        self.mode == RunMode::Development
    }

    /// Port of the primary server; HTTPS wins when both are configured.
    pub fn primary_port(&self) -> Option<u16> {
        self.listener.https_port.or(self.listener.http_port)
    }

    /// The primary server speaks TLS whenever an HTTPS port is configured.
    pub fn primary_uses_tls(&self) -> bool {
        self.listener.https_port.is_some()
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Production,
    Development,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ListenerConfig {
    pub http_port: Option<u16>,

    pub https_port: Option<u16>,

    /// Bind address override; all interfaces when unset.
    pub ip_address: Option<String>,
}

/// Paths to TLS material.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TlsPaths {
    pub private_key_path: Option<PathBuf>,
    pub public_cert_chain_path: Option<PathBuf>,
    pub trusted_ca_path: Option<PathBuf>,
    pub private_key_pass_file_path: Option<PathBuf>,
}

/// Development server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DevConfig {
    pub proxy_port: Option<u16>,

    pub cdn_port: Option<u16>,

    /// Directory served by the dev CDN under `/static`.
    pub static_dir: PathBuf,

    /// JSON file describing dev proxy remotes.
    pub endpoints_path: PathBuf,

    /// Module map written by local module builds; watched for changes.
    pub local_module_map_path: PathBuf,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            proxy_port: None,
            cdn_port: None,
            static_dir: PathBuf::from("static"),
            endpoints_path: PathBuf::from(".dev/endpoints/index.json"),
            local_module_map_path: PathBuf::from("static/module-map.json"),
        }
    }
}

/// Health thresholds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Name of the module whose presence means "ready for traffic".
    pub root_module_name: String,

    /// Inclusive CPU ceiling in percent.
    pub max_cpu_percent: f64,

    /// Inclusive resident memory ceiling in bytes.
    pub max_memory_bytes: u64,

    /// Exclusive scheduler delay ceiling in milliseconds.
    pub max_tick_delay_ms: u64,
}

impl HealthConfig {
    pub fn max_tick_delay(&self) -> Duration {
        Duration::from_millis(self.max_tick_delay_ms)
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            root_module_name: "root".to_string(),
            max_cpu_percent: 80.0,
            max_memory_bytes: 1_400_000_000,
            max_tick_delay_ms: 1_000,
        }
    }
}

/// Module map source and polling intervals.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModuleMapConfig {
    /// Remote module map. Development mode falls back to the local file.
    pub url: Option<String>,

    pub poll_min_ms: u64,

    pub poll_max_ms: u64,

    pub fetch_timeout_secs: u64,
}

impl Default for ModuleMapConfig {
    fn default() -> Self {
        Self {
            url: None,
            poll_min_ms: 5_000,
            poll_max_ms: 300_000,
            fetch_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: Option<LogFormat>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LoggingConfig {
    /// JSON in production, pretty output in development, unless set.
    pub fn effective_format(&self, mode: RunMode) -> LogFormat {
        self.format.unwrap_or(match mode {
            RunMode::Production => LogFormat::Json,
            RunMode::Development => LogFormat::Pretty,
        })
    }
}
