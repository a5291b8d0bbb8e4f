//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that every server the mode needs has a port
//! - Validate value ranges (thresholds > 0, poll bounds ordered)
//! - Detect port collisions between servers
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashMap;
use std::fmt;

use crate::config::schema::ServerConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingPort(&'static str),
    PortConflict { port: u16, first: &'static str, second: &'static str },
    NonPositive(&'static str),
    PollBounds { min_ms: u64, max_ms: u64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingPort(server) => write!(f, "{} requires a port", server),
            ValidationError::PortConflict { port, first, second } => {
                write!(f, "port {} is used by both {} and {}", port, first, second)
            }
            ValidationError::NonPositive(field) => write!(f, "{} must be positive", field),
            ValidationError::PollBounds { min_ms, max_ms } => {
                write!(f, "poll_min_ms ({}) exceeds poll_max_ms ({})", min_ms, max_ms)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // (server, port, required). An unset optional port disables that server.
    let mut ports: Vec<(&'static str, Option<u16>, bool)> = vec![
        ("app server", config.primary_port(), true),
        ("metrics server", config.metrics_port, false),
    ];
    if config.is_development() {
        ports.push(("dev cdn server", config.dev.cdn_port, true));
        ports.push(("dev proxy server", config.dev.proxy_port, true));
    }

    let mut seen: HashMap<u16, &'static str> = HashMap::new();
    for (server, port, required) in ports {
        match port {
            None if required => errors.push(ValidationError::MissingPort(server)),
            None => {}
            // Port 0 asks the OS for an ephemeral port and never collides.
            Some(0) => {}
            Some(port) => {
                if let Some(first) = seen.insert(port, server) {
                    errors.push(ValidationError::PortConflict { port, first, second: server });
                }
            }
        }
    }

    let max_cpu = config.health.max_cpu_percent;
    if max_cpu.is_nan() || max_cpu <= 0.0 {
        errors.push(ValidationError::NonPositive("health.max_cpu_percent"));
    }
    if config.health.max_memory_bytes == 0 {
        errors.push(ValidationError::NonPositive("health.max_memory_bytes"));
    }
    if config.health.max_tick_delay_ms == 0 {
        errors.push(ValidationError::NonPositive("health.max_tick_delay_ms"));
    }
    if config.module_map.poll_min_ms == 0 {
        errors.push(ValidationError::NonPositive("module_map.poll_min_ms"));
    }
    if config.module_map.fetch_timeout_secs == 0 {
        errors.push(ValidationError::NonPositive("module_map.fetch_timeout_secs"));
    }
    if config.module_map.poll_min_ms > config.module_map.poll_max_ms {
        errors.push(ValidationError::PollBounds {
            min_ms: config.module_map.poll_min_ms,
            max_ms: config.module_map.poll_max_ms,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RunMode;

    fn production() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.listener.http_port = Some(3000);
        config.metrics_port = Some(3005);
        config
    }

    #[test]
    fn accepts_production_config() {
        assert!(validate_config(&production()).is_ok());
    }

    #[test]
    fn reports_every_problem() {
        let mut config = ServerConfig::default();
        config.mode = RunMode::Development;
        config.health.max_memory_bytes = 0;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::MissingPort("app server")));
        assert!(errors.contains(&ValidationError::MissingPort("dev cdn server")));
        assert!(errors.contains(&ValidationError::MissingPort("dev proxy server")));
        assert!(errors.contains(&ValidationError::NonPositive("health.max_memory_bytes")));
    }

    #[test]
    fn metrics_port_is_optional() {
        let mut config = ServerConfig::default();
        config.listener.http_port = Some(3000);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn detects_port_conflicts() {
        let mut config = production();
        config.metrics_port = Some(3000);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::PortConflict {
                port: 3000,
                first: "app server",
                second: "metrics server",
            }]
        );
    }

    #[test]
    fn ephemeral_ports_never_conflict() {
        let mut config = production();
        config.listener.http_port = Some(0);
        config.metrics_port = Some(0);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_nan_cpu_limit_and_zero_fetch_timeout() {
        let mut config = production();
        config.health.max_cpu_percent = f64::NAN;
        config.module_map.fetch_timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::NonPositive("health.max_cpu_percent"),
                ValidationError::NonPositive("module_map.fetch_timeout_secs"),
            ]
        );
    }

    #[test]
    fn rejects_inverted_poll_bounds() {
        let mut config = production();
        config.module_map.poll_min_ms = 10_000;
        config.module_map.poll_max_ms = 1_000;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::PollBounds { min_ms: 10_000, max_ms: 1_000 }]);
    }
}
