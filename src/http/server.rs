//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the item routes and route-not-found fallback
//! - Wire up middleware (tracing, request ID, timeout, limits, CORS, headers)
//! - Install the terminal error renderer
//! - Serve over plain HTTP or TLS with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, middleware, Router};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::http::error::{not_found, render_errors};
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::items::{setup_items_router, ItemRepository};
use crate::observability::metrics;
use crate::security::headers::apply_security_headers;

/// Mount point of the versioned API.
pub const API_PREFIX: &str = "/api/v1";

/// HTTP server for the items API.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    repository: Arc<ItemRepository>,
}

impl HttpServer {
    /// Create a server backed by the seeded sample store.
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_repository(config, Arc::new(ItemRepository::seeded()))
    }

    /// Create a server backed by the given store.
    pub fn with_repository(config: ServiceConfig, repository: Arc<ItemRepository>) -> Self {
        let router = Self::build_router(&config, repository.clone());
        Self {
            router,
            config,
            repository,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, repository: Arc<ItemRepository>) -> Router {
        let environment = Arc::new(config.environment.clone());

        let mut router = setup_items_router(API_PREFIX, repository)
            .fallback(not_found)
            .layer(middleware::from_fn_with_state(environment, render_errors))
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(DefaultBodyLimit::max(config.security.max_body_size));

        if config.security.enable_headers {
            router = apply_security_headers(router);
        }

        router.layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                .layer(propagate_request_id_layer())
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
    }

    /// A handle to the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The store this server serves.
    pub fn repository(&self) -> Arc<ItemRepository> {
        self.repository.clone()
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!(grace_secs = grace.as_secs(), "Shutdown signal received");
            shutdown_handle.graceful_shutdown(Some(grace));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}
