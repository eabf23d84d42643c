use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wardrobe_service::{config::ServerConfig, routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();

    std::fs::create_dir_all(&config.storage.upload_dir)
        .context("Failed to create upload directory")?;

    let state = Arc::new(AppState::open(&config).context("Failed to initialize storage")?);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    tracing::info!(
        addr = %config.bind,
        data_dir = %config.storage.data_dir.display(),
        upload_dir = %config.storage.upload_dir.display(),
        "wardrobe service listening"
    );

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
