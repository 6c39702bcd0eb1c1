//! Items API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ listener (HTTP / TLS)
//!                        │
//!                        ▼
//!                 tower-http stack: request id → trace → CORS → timeout
//!                        │
//!                        ▼
//!                 security headers → metrics → body limit → error renderer
//!                        │
//!                        ▼
//!                 router ── no match ──▶ route-not-found ─┐
//!                        │                                │
//!                        ▼                                │
//!                 validator (params → body → query) ──────┤ ApiError
//!                        │                                │
//!                        ▼                                │
//!                 handler ──▶ ItemRepository ─────────────┘
//!                        │
//!     Client Response ◀──┘  status + JSON
//! ```

use std::path::PathBuf;

use clap::Parser;

use items_api::config::load_config;
use items_api::lifecycle::{self, Shutdown};
use items_api::observability::logging;

#[derive(Parser)]
#[command(name = "items-api")]
#[command(about = "In-memory items CRUD service", long_about = None)]
struct Args {
    /// Optional TOML configuration file. Environment variables override it.
    #[arg(short, long, env = "ITEMS_API_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "items-api starting");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    lifecycle::start(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
