//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that referenced TLS files exist
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem with a config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a config for semantic errors.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.environment.name.trim().is_empty() {
        errors.push(ValidationError::new("environment.name", "must not be empty"));
    }
    if config.environment.secret.is_empty() {
        errors.push(ValidationError::new("environment.secret", "must not be empty"));
    }

    if let Err(e) = config.listener.bind_address.parse::<SocketAddr>() {
        errors.push(ValidationError::new("listener.bind_address", e.to_string()));
    }

    if let Some(tls) = &config.listener.tls {
        if !Path::new(&tls.cert_path).exists() {
            errors.push(ValidationError::new(
                "listener.tls.cert_path",
                format!("certificate file not found: {}", tls.cert_path),
            ));
        }
        if !Path::new(&tls.key_path).exists() {
            errors.push(ValidationError::new(
                "listener.tls.key_path",
                format!("private key file not found: {}", tls.key_path),
            ));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if config.observability.metrics_enabled {
        if let Err(e) = config.observability.metrics_address.parse::<SocketAddr>() {
            errors.push(ValidationError::new("observability.metrics_address", e.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
