//! booking-server: HTTP surface of the booking engine
//!
//! - Booking creation, payment dispatch and status
//! - Refund requests and staff decisions
//! - Signed gateway webhooks (push) and a background poller (pull)

mod api;
mod config;
mod logger;
mod poller;
mod state;

use std::sync::Arc;

use booking_engine::{BookingService, Gateways, HttpGateway, RedbBookingStore};

use crate::config::Config;
use crate::state::AppState;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    logger::init_logger(
        config.log_level.as_deref(),
        config.log_json,
        config.log_dir.as_deref(),
    );

    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "Starting booking-server"
    );

    if let Some(parent) = std::path::Path::new(&config.database_path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let store = Arc::new(RedbBookingStore::open(&config.database_path)?);
    tracing::info!(path = %config.database_path, "Booking store opened");

    let gateways = Gateways::new(
        Arc::new(HttpGateway::new(config.wallet_gateway.clone())),
        Arc::new(HttpGateway::new(config.card_gateway.clone())),
    );
    let service = BookingService::new(store, gateways, config.engine.clone());

    let poll_task = poller::spawn_poller(service.clone(), service.config().poll_interval);

    let state = AppState::new(service, &config);
    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("HTTP server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    poll_task.abort();
    if let Err(e) = poll_task.await
        && !e.is_cancelled()
    {
        tracing::error!(error = %e, "Payment poller exited abnormally");
    }
    tracing::info!("booking-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
