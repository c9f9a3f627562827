//! Key service HTTP server.
//!
//! # Responsibilities
//! - Create the Axum router with the key service handlers
//! - Wire up middleware (request id, tracing, timeout)
//! - Serve on a listener until the shutdown signal fires

use axum::{routing::get, Router};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::handlers::{self, AppState};
use crate::http::request::{propagate_request_id, set_request_id};
use crate::lifecycle::Shutdown;

/// Server exposing the custodial key lookup to the dApp.
pub struct KeyServer {
    router: Router,
    config: AppConfig,
}

impl KeyServer {
    /// Create a server with state built from `config`.
    pub fn new(config: AppConfig) -> Self {
        let state = AppState::from_config(&config);
        Self::with_state(config, state)
    }

    /// Create a server around prepared state.
    pub fn with_state(config: AppConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route(
                "/api/wallets/{wallet_id}/public-key",
                get(handlers::wallet_public_key),
            )
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(propagate_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id())
    }

    /// Run the server until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            network = %self.config.chain.network_name,
            chain_id = self.config.chain.chain_id,
            "Key service starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.signalled())
            .await?;

        tracing::info!("Key service stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
