//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize metrics when enabled
//! - Bind the listener (plain or TLS) and begin accepting traffic
//! - Run until the shutdown coordinator fires
//!
//! Configuration loading and logging happen in `main` before this runs, so
//! config errors are reported before anything binds.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::tls::load_tls_config;
use crate::observability::metrics;

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid bind address {0}: {1}")]
    Address(String, std::net::AddrParseError),
    #[error("metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
    #[error("TLS: {0}")]
    Tls(std::io::Error),
    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

/// Bring the service up and serve until `shutdown` triggers.
pub async fn start(config: ServiceConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    tracing::info!(
        environment = %config.environment.name,
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|e| StartupError::Address(config.observability.metrics_address.clone(), e))?;
        metrics::init_metrics(addr)?;
    }

    let addr: SocketAddr = config
        .listener
        .bind_address
        .parse()
        .map_err(|e| StartupError::Address(config.listener.bind_address.clone(), e))?;
    let tls = config.listener.tls.clone();
    let server = HttpServer::new(config);

    match tls {
        Some(tls) => {
            let rustls = load_tls_config(&tls).await.map_err(StartupError::Tls)?;
            server.run_tls(addr, rustls, shutdown.subscribe()).await?;
        }
        None => {
            let listener = TcpListener::bind(addr).await?;
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    Ok(())
}
