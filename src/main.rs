//! Application server (v1)
//!
//! Boots the app server, the metrics server and, in development, the dev
//! CDN and dev proxy, then supervises them until a termination signal.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────── StartupOrchestrator ────────────────────────┐
//!   │                                                                     │
//!   │  dev CDN ─▶ dev proxy ─▶ load modules ─▶ app server ─▶ metrics      │
//!   │     │           │                            │            │         │
//!   │     └───────────┴──── ServerRegistry ◀───────┴────────────┘         │
//!   │                            │                                        │
//!   │   signal / fatal error ─▶ ShutdownCoordinator ─▶ close all ─▶ exit  │
//!   └─────────────────────────────────────────────────────────────────────┘
//!
//!   GET /im-up ─▶ HealthSampler ─▶ { process, holocron, status }
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use app_server::config::{self, LogFormat, RunMode, ServerConfig};
use app_server::health::{HealthSampler, SysinfoProbe, Thresholds};
use app_server::holocron::ModuleStore;
use app_server::http::StandardServers;
use app_server::lifecycle::StartupOrchestrator;
use app_server::observability::{logging, metrics};

#[derive(Debug, Parser)]
#[command(name = "app-server", version, about = "Application server with health supervision")]
struct Cli {
    /// TOML configuration file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run in development mode (dev CDN, dev proxy, local module watching).
    #[arg(long)]
    dev: bool,

    /// Remote module map URL.
    #[arg(long)]
    module_map_url: Option<String>,

    /// Log output format. Defaults to json in production, pretty in development.
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let base = match cli.config.as_deref() {
        Some(path) => config::loader::load_config(path),
        None => Ok(ServerConfig::default()),
    };
    let mut config = match base.and_then(|c| config::loader::apply_env(c, |name| std::env::var(name).ok())) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if cli.dev {
        config.mode = RunMode::Development;
    }
    if let Some(url) = cli.module_map_url {
        config.module_map.url = Some(url);
    }
    if let Some(format) = cli.log_format {
        config.logging.format = Some(format);
    }
    if let Err(errors) = config::validation::validate_config(&config) {
        for error in errors {
            eprintln!("Invalid configuration: {error}");
        }
        return ExitCode::FAILURE;
    }

    if let Err(e) = logging::init(config.logging.effective_format(config.mode)) {
        eprintln!("Failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = ?config.mode,
        primary_port = ?config.primary_port(),
        tls = config.primary_uses_tls(),
        "app-server starting"
    );

    let prometheus = match metrics::install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics recorder");
            return ExitCode::FAILURE;
        }
    };

    let probe = match SysinfoProbe::new() {
        Ok(probe) => probe,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialise process probe");
            return ExitCode::FAILURE;
        }
    };

    let config = Arc::new(config);
    let store = Arc::new(ModuleStore::new());
    let sampler = Arc::new(HealthSampler::new(
        Arc::new(probe),
        store.clone(),
        config.health.root_module_name.clone(),
        Thresholds::from(&config.health),
    ));

    let servers = StandardServers::new(Arc::clone(&config), sampler, store, prometheus);
    let code = StartupOrchestrator::new(config, servers).run().await;

    tracing::info!(exit_code = code, "Shutdown complete");
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
