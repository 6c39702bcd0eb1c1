//! Configuration loading from disk and the process environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{ServiceConfig, TlsConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid environment variable {var}: {reason}")]
    Env { var: &'static str, reason: String },
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, overlay the process
/// environment, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto a config.
///
/// `NODE_ENV` and `JWT_SECRET` win over their `APP_ENV` and `API_SECRET`
/// aliases. `lookup` abstracts the environment so callers can supply a fixed map.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(name) = lookup("NODE_ENV").or_else(|| lookup("APP_ENV")) {
        config.environment.name = name;
    }

    if let Some(secret) = lookup("JWT_SECRET").or_else(|| lookup("API_SECRET")) {
        config.environment.secret = secret;
    }

    if let Some(port) = lookup("API_PORT") {
        let port: u16 = port.trim().parse().map_err(|e| ConfigError::Env {
            var: "API_PORT",
            reason: format!("{e}"),
        })?;
        let mut addr: SocketAddr =
            config
                .listener
                .bind_address
                .parse()
                .map_err(|e| ConfigError::Env {
                    var: "API_PORT",
                    reason: format!("bind address {:?} is not a socket address: {e}", config.listener.bind_address),
                })?;
        addr.set_port(port);
        config.listener.bind_address = addr.to_string();
    }

    match (lookup("TLS_CERT_PATH"), lookup("TLS_KEY_PATH")) {
        (Some(cert_path), Some(key_path)) => {
            config.listener.tls = Some(TlsConfig { cert_path, key_path });
        }
        (None, None) => {}
        _ => {
            return Err(ConfigError::Env {
                var: "TLS_CERT_PATH",
                reason: "TLS_CERT_PATH and TLS_KEY_PATH must be set together".to_string(),
            });
        }
    }

    Ok(())
}
