//! Server entrypoint: loads `CONFIG_PATH` (default `configs/config.json`), migrates the users table, serves the API.

use tokio::net::TcpListener;
use user_service::{config, load_config, logging, router, ApplicationContext};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.into());
    let config = load_config(&path)?;
    logging::init(&config.log);

    let ctx = ApplicationContext::new(&config).await?;
    let app = router(&ctx, &config)?;

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    tracing::info!(service = %config.server.name, "listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
