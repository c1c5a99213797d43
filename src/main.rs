//! site-ssr: social meta injection for deep-linked news pages.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!                        │                   site-ssr                     │
//!   GET /news/{id}       │  ┌──────────┐   ┌──────────┐   ┌───────────┐  │
//!   ─────────────────────┼─▶│ fetcher  │──▶│ resolver │──▶│  patcher  │──┼──▶ 200 text/html
//!                        │  │ (race)   │   │  (Meta)  │   │  (<head>) │  │
//!                        │  └────┬─────┘   └──────────┘   └─────▲─────┘  │
//!                        │       │                              │        │
//!                        │       ▼                        ┌─────┴─────┐  │
//!                        │   news API ◀── relays          │ template  │  │
//!                        │                                └───────────┘  │
//!   ANY /api/*           │  ┌──────────────┐                             │
//!   ─────────────────────┼─▶│ passthrough  │─────────────────────────────┼──▶ backend
//!                        │  └──────────────┘                             │
//!                        └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use site_ssr::config::load_effective;
use site_ssr::observability::{logging, metrics};
use site_ssr::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "site-ssr")]
#[command(about = "Serves share metadata for news pages and relays /api/* to the backend")]
struct Args {
    /// TOML configuration file (also SITE_SSR_CONFIG).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address, e.g. 127.0.0.1:3000.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_effective(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("site-ssr v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        news_url = %config.upstream.news_url(),
        relays = config.upstream.relays.len(),
        fetch_timeout_ms = config.upstream.fetch_timeout_ms,
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

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = std::sync::Arc::new(Shutdown::new());
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signal_shutdown.trigger_on_signal().await;
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
