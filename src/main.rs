//! Time Dollar key service.
//!
//! Serves the custodial wallet public-key lookup to the dApp so the embedded
//! signing path can build authenticators without exposing provider
//! credentials to browsers.
//!
//! # Architecture Overview
//!
//! ```text
//!     dApp (browser)                         ┌──────────────────────────┐
//!     ───────────────── GET /api/wallets/ ──▶│ key service (this binary)│
//!                        {id}/public-key     │  request id → trace →    │
//!                                            │  timeout → handler       │
//!                                            └────────────┬─────────────┘
//!                                                         │ basic auth
//!                                                         ▼
//!                                            ┌──────────────────────────┐
//!                                            │ custodial provider API   │
//!                                            └──────────────────────────┘
//! ```
//!
//! Configuration is read from the path given as the first argument, or
//! `TIMEBANK_CONFIG`, falling back to defaults.

use std::path::PathBuf;
use tokio::net::TcpListener;

use timebank_signer::config::load_or_default;
use timebank_signer::lifecycle::{signals, Shutdown};
use timebank_signer::observability::{logging, metrics};
use timebank_signer::KeyServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TIMEBANK_CONFIG").ok())
        .map(PathBuf::from);
    let config = load_or_default(config_path.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?config_path,
        "timebank key service starting"
    );

    tracing::info!(
        bind_address = %config.server.bind_address,
        rpc_url = %config.chain.rpc_url,
        chain_id = config.chain.chain_id,
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    KeyServer::new(config).run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
