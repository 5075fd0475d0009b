//! # friendtracker-server
//!
//! Hosted contact service for Friend Tracker clients.

use tracing::info;
use tracing_subscriber::EnvFilter;

use friendtracker_server::{open_database, serve, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("info,friendtracker_server=debug,friendtracker_store=info")
            }),
        )
        .init();

    info!("Starting Friend Tracker server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");
    if config.access_token.is_none() {
        tracing::warn!("ACCESS_TOKEN not set, contact routes are open to anyone");
    }

    // -----------------------------------------------------------------------
    // 3. Open the contact database
    // -----------------------------------------------------------------------
    let db = open_database(&config)?;
    let http_addr = config.http_addr;
    let app_state = AppState::new(db, config);

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
