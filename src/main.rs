use tracing_subscriber::EnvFilter;

use ledger_dashboard::api::{self, AppState};
use ledger_dashboard::config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Initialize structured logging (set RUST_LOG=debug to see explorer queries)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    tracing::info!("Ledger dashboard starting");

    // An explicit path must exist; the default one is optional
    let explicit_path = std::env::args().nth(1);
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path, explicit_path.is_some())?;
    tracing::info!(
        base_url = %config.explorer.base_url,
        chain_id = config.explorer.chain_id,
        api_key_configured = config.explorer.api_key.is_some(),
        "Configuration loaded from {}",
        config_path
    );

    let host = config.api.host.clone();
    let port = config.api.port;
    let state = AppState::new(config)?;

    api::serve(state, &host, port).await?;

    tracing::info!("Ledger dashboard stopped gracefully");
    Ok(())
}
