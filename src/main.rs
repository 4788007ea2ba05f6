//! Resilient catalog service.
//!
//! Serves product data from an unreliable upstream catalog, shielding
//! callers with a read-through cache, a circuit breaker and a static
//! fallback dataset.
//!
//! # Architecture Overview
//!
//! ```text
//!   Collaborator            ┌──────────────────────────────────────────────┐
//!   ───────────────────────▶│ http (axum)                                  │
//!                           │   └─▶ fetcher ──▶ breaker open? ──▶ fallback │
//!                           │          │                                   │
//!                           │          ├──▶ cache hit? ──▶ cached value    │
//!                           │          │                                   │
//!                           │          └──▶ upstream (reqwest, timeout) ───┼──▶ Catalog API
//!                           │                  │                           │
//!                           │                  └──▶ cache write / breaker  │
//!                           │                                              │
//!                           │ config (+ watcher) · observability · admin   │
//!                           └──────────────────────────────────────────────┘
//! ```

use arc_swap::ArcSwap;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use resilient_catalog::config::{load_with_env, ConfigWatcher};
use resilient_catalog::http::{AppState, HttpServer};
use resilient_catalog::lifecycle::{apply_reload, build_fetcher, signals, Shutdown};
use resilient_catalog::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "resilient-catalog")]
#[command(about = "Cached, circuit-broken access to an upstream product catalog", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_with_env(args.config.as_deref())?;
    logging::init(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "resilient-catalog starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        degraded_mode = config.fallback.degraded_mode,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let fetcher = Arc::new(build_fetcher(&config)?);
    let shared_config = Arc::new(ArcSwap::from_pointee(config.clone()));
    let shutdown = Shutdown::new();

    // Keep the watcher handle alive for the lifetime of the server
    let _watcher = match &args.config {
        Some(path) => {
            let (watcher, mut updates) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(handle) => {
                    let fetcher = fetcher.clone();
                    let shared_config = shared_config.clone();
                    let mut stop = shutdown.subscribe();
                    tokio::spawn(async move {
                        loop {
                            tokio::select! {
                                Some(new_config) = updates.recv() => {
                                    apply_reload(&shared_config, &fetcher, new_config);
                                }
                                _ = stop.recv() => break,
                            }
                        }
                    });
                    Some(handle)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
                    None
                }
            }
        }
        None => None,
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let server = HttpServer::new(AppState::new(fetcher, shared_config), &config.listener);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
