//! atelier service binary.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atelier_service::{create_router, AppState, ServiceConfig};
use atelier_store::RocksStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,atelier=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        auth_configured = config.auth_jwt_secret.is_some(),
        midtrans_configured = config.midtrans_server_key.is_some(),
        midtrans_production = config.midtrans_production,
        gemini_configured = config.gemini_api_key.is_some(),
        purchase_cost = config.policy.purchase_cost,
        owner_reward = config.policy.owner_reward,
        starting_coins = config.policy.starting_coins,
        "Starting atelier"
    );

    let store = Arc::new(RocksStore::open_with_policy(&config.data_dir, config.policy)?);
    let listen_addr = config.listen_addr.clone();
    let app = create_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(listen_addr = %listen_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

/// Resolves on Ctrl-C so in-flight store transactions can finish.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
