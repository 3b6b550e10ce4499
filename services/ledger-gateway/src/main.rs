// Ledger Gateway Service - entry point

use anyhow::Context;
use ledger_gateway::{build_router, AppState, Config};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_line_number(true)
        .json()
        .init();

    let config = Config::load().context("failed to load configuration")?;
    info!(
        service = %config.ledger.service_name,
        version = %config.ledger.service_version,
        "Starting ledger gateway"
    );

    let bind_addr = config.bind_addr();
    let state = AppState::new(config).context("failed to register metrics")?;
    let ledger = state.ledger.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!("Gateway listening on: {}", bind_addr);
    info!("   POST /api/v1/transaction - Record a transaction");
    info!("   GET  /api/v1/transaction - Paginated history (offset, limit)");
    info!("   GET  /api/v1/account     - Current balance");
    info!("   GET  /api/v1/health      - Liveness");
    info!("   GET  /metrics            - Prometheus metrics");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = ledger.shutdown().await {
        warn!(error = %e, "Ledger actor already stopped");
    }
    info!("Ledger gateway stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
