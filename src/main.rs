use finwatch::config::Config;
use finwatch::scheduler::RefreshScheduler;
use finwatch::server::ApiServer;
use finwatch::state::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finwatch=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting FinWatch...");

    let config = Config::from_env()?;

    // Initialize application state (database, secrets, ticker table)
    let state = Arc::new(AppState::new(config)?);
    tracing::info!("Application state initialized");

    // Start background analyst-target refresh
    RefreshScheduler::new(state.clone()).start();

    // Start the API server
    let mut server = ApiServer::new(state);
    server.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received shutdown signal");
    server.stop();

    Ok(())
}
