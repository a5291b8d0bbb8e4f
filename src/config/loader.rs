//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::schema::{RunMode, ServerConfig};
use crate::error::ConfigError;

/// Load a configuration file without validating it.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment-style variables on top of `config`.
///
/// `lookup` stands in for `std::env::var`; absent or empty values leave the
/// existing setting untouched.
pub fn apply_env<F>(mut config: ServerConfig, lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(v) = get("HTTP_PORT") {
        config.listener.http_port = Some(parse("HTTP_PORT", v)?);
    }
    if let Some(v) = get("HTTPS_PORT") {
        config.listener.https_port = Some(parse("HTTPS_PORT", v)?);
    }
    if let Some(v) = get("IP_ADDRESS") {
        config.listener.ip_address = Some(v);
    }
    if let Some(v) = get("HTTPS_PRIVATE_KEY_PATH") {
        config.tls.private_key_path = Some(PathBuf::from(v));
    }
    if let Some(v) = get("HTTPS_PUBLIC_CERT_CHAIN_PATH") {
        config.tls.public_cert_chain_path = Some(PathBuf::from(v));
    }
    if let Some(v) = get("HTTPS_TRUSTED_CA_PATH") {
        config.tls.trusted_ca_path = Some(PathBuf::from(v));
    }
    if let Some(v) = get("HTTPS_PRIVATE_KEY_PASS_FILE_PATH") {
        config.tls.private_key_pass_file_path = Some(PathBuf::from(v));
    }
    if let Some(v) = get("HTTP_METRICS_PORT") {
        config.metrics_port = Some(parse("HTTP_METRICS_PORT", v)?);
    }
    if let Some(v) = get("HTTP_DEV_PROXY_SERVER_PORT") {
        config.dev.proxy_port = Some(parse("HTTP_DEV_PROXY_SERVER_PORT", v)?);
    }
    if let Some(v) = get("HTTP_DEV_CDN_PORT") {
        config.dev.cdn_port = Some(parse("HTTP_DEV_CDN_PORT", v)?);
    }
    if let Some(v) = get("APP_ENV") {
        config.mode = match v.as_str() {
            "development" => RunMode::Development,
            "production" => RunMode::Production,
            _ => return Err(ConfigError::InvalidEnv { name: "APP_ENV", value: v }),
        };
    }
    if let Some(v) = get("ROOT_MODULE_NAME") {
        config.health.root_module_name = v;
    }
    if let Some(v) = get("MODULE_MAP_URL") {
        config.module_map.url = Some(v);
    }

    Ok(config)
}

fn parse<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn overlays_ports_and_tls_paths() {
        let config = apply_env(
            ServerConfig::default(),
            env(&[
                ("HTTPS_PORT", "8443"),
                ("HTTPS_PRIVATE_KEY_PATH", "key.pem"),
                ("HTTPS_PUBLIC_CERT_CHAIN_PATH", "cert.pem"),
                ("HTTP_METRICS_PORT", "3005"),
            ]),
        )
        .unwrap();

        assert_eq!(config.listener.https_port, Some(8443));
        assert_eq!(config.tls.private_key_path, Some(PathBuf::from("key.pem")));
        assert_eq!(config.tls.public_cert_chain_path, Some(PathBuf::from("cert.pem")));
        assert_eq!(config.tls.trusted_ca_path, None);
        assert_eq!(config.metrics_port, Some(3005));
    }

    #[test]
    fn empty_values_are_ignored() {
        let mut base = ServerConfig::default();
        base.listener.ip_address = Some("10.0.0.1".into());

        let config = apply_env(base, env(&[("IP_ADDRESS", "")])).unwrap();
        assert_eq!(config.listener.ip_address.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn rejects_non_numeric_port() {
        let err = apply_env(ServerConfig::default(), env(&[("HTTP_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: "HTTP_PORT", .. }));
    }

    #[test]
    fn app_env_selects_mode() {
        let config = apply_env(ServerConfig::default(), env(&[("APP_ENV", "development")])).unwrap();
        assert!(config.is_development());

        let err = apply_env(ServerConfig::default(), env(&[("APP_ENV", "staging")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: "APP_ENV", .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
