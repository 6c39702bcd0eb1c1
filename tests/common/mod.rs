//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use items_api::config::ServiceConfig;
use items_api::http::HttpServer;
use items_api::items::ItemRepository;
use items_api::lifecycle::Shutdown;
use tokio::net::TcpListener;

/// A running server on an ephemeral port. Stops when dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    pub repository: Arc<ItemRepository>,
    shutdown: Shutdown,
}

impl TestServer {
    /// Absolute URL for a path under the server root.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server with the default config and the seeded store.
pub async fn start_server() -> TestServer {
    start_server_with(ServiceConfig::default(), Arc::new(ItemRepository::seeded())).await
}

/// Start a server with an explicit config and store.
pub async fn start_server_with(config: ServiceConfig, repository: Arc<ItemRepository>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::with_repository(config, repository.clone());
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        addr,
        repository,
        shutdown,
    }
}

/// Client that never reuses connections between tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
