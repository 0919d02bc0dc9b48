use anyhow::Context;
use restaurant_server::{AppState, Config, api, logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Invalid configuration")?;

    logger::init_logger(config.log_dir.as_deref());

    tracing::info!(
        environment = %config.environment,
        opens_at = %config.hours.opens_at.format("%H:%M"),
        closes_at = %config.hours.closes_at.format("%H:%M"),
        closed_on = ?config.hours.closed_on,
        timezone = %config.hours.timezone,
        "Starting restaurant-server"
    );

    let state = AppState::new(&config)
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize database")?;

    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("restaurant-server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("restaurant-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
