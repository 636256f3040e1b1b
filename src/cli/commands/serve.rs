use anyhow::Context;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::state::AppState;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    config.validate().map_err(anyhow::Error::msg)?;
    tracing::info!("Starting Order Desk API in {:?} mode", config.environment);

    let stores = DatabaseManager::open(&config.database)
        .await
        .context("failed to open storage backend")?;
    let state = AppState::new(stores, &config).context("failed to initialize token service")?;
    let app = crate::app(state, &config);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Order Desk API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
