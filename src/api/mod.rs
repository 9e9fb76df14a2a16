pub mod handlers;
pub mod queries;
pub mod types;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::LedgerError;
use crate::explorer::ExplorerClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when no API key is configured; data endpoints then answer 500.
    pub explorer: Option<ExplorerClient>,
}

impl AppState {
    pub fn new(config: Config) -> eyre::Result<Self> {
        let explorer = match config.explorer.api_key.clone() {
            Some(api_key) => Some(ExplorerClient::new(&config.explorer, api_key)?),
            None => {
                tracing::warn!("ETHERSCAN_API_KEY is not set, data endpoints will fail");
                None
            }
        };
        Ok(Self { config, explorer })
    }

    pub fn explorer(&self) -> Result<&ExplorerClient, LedgerError> {
        self.explorer.as_ref().ok_or(LedgerError::MissingCredential)
    }
}

pub fn router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/health", get(handlers::health))
        .route("/balance", get(handlers::balance))
        .route("/token-balance", get(handlers::token_balance))
        .route("/tokens", get(handlers::tokens))
        .route("/transactions", get(handlers::transactions))
        .route("/overview", get(handlers::overview))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(state: AppState, host: &str, port: u16) -> eyre::Result<()> {
    let app = router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping API server");
}
