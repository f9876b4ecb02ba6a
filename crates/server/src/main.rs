//! finsight HTTP server
//!
//! Configuration comes from `finsight.toml` (or `$FINSIGHT_CONFIG`) and
//! `FINSIGHT_*` environment variables; see `config.rs`.

use std::sync::Arc;

use anyhow::{Context, Result};
use finsight_server::{config::ServerConfig, create_router, logging, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::load().context("Failed to load configuration")?;
    logging::init(config.log_format);

    let pool = finsight_storage::create_db(&config.database)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.display()))?;
    let state = AppState::build(&config, pool).await?;

    let app = create_router(Arc::new(state), &config.allowed_origins);
    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    info!(
        bind = %config.bind,
        database = %config.database.display(),
        "finsight server listening"
    );
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
    info!("Shutting down");
}
