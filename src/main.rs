//! # Ether Relay
//!
//! Main entry point for the relay service.

use std::sync::Arc;

use anyhow::Context;
use ether_relay::api::middleware::logging::LoggingConfig;
use ether_relay::api::rest::handlers::AppState;
use ether_relay::api::rest::routes::{cors_layer, create_router};
use ether_relay::api::websocket::WebSocketState;
use ether_relay::application::{EventBridge, SendEtherUseCase, SubscriberRegistry};
use ether_relay::config::{AppConfig, LogConfig, LogFormat};
use ether_relay::infrastructure::blockchain::{EthersChainClient, EthersEventSource};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.log)?;
    config.validate().context("invalid configuration")?;

    info!("Starting Ether relay v{}", env!("CARGO_PKG_VERSION"));

    let chain = &config.chain;
    let client = EthersChainClient::new(chain)?;
    let send_ether = SendEtherUseCase::new(
        Arc::new(client),
        chain.contract()?,
        chain.transfer_method.clone(),
        chain.gas(),
    );

    let registry = SubscriberRegistry::new();
    let source = EthersEventSource::new(chain)?;
    let bridge = EventBridge::new(Arc::new(source), registry.clone(), chain.event_filter()?).spawn();

    let cors = cors_layer(&config.server.cors_origin).context("invalid CORS origin")?;
    let logging = LoggingConfig {
        log_headers: config.log.log_headers,
        ..LoggingConfig::default()
    };
    let router = create_router(
        Arc::new(AppState::new(send_ether)),
        Arc::new(WebSocketState::new(registry)),
        cors,
        logging,
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, cors_origin = %config.server.cors_origin, "Server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    bridge.abort();
    info!("Shutting down Ether relay");

    Ok(())
}

fn init_tracing(log: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.level))
        .context("invalid log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(log.include_target);

    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
