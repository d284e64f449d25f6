//! xrate Gateway Binary
//!
//! Serves exchange rates over HTTP until interrupted.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use xrate_fx::{HttpFetcher, RateResolver};
use xrate_gateway::{GatewayConfig, GatewayServer, LogFormat};

fn init_tracing(config: &GatewayConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env();
    init_tracing(&config);

    info!("Starting xrate gateway");

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }
    let bind_address = config.bind_address().map_err(anyhow::Error::msg)?;

    let fetcher = Arc::new(HttpFetcher::new(config.fetch_timeout));
    let resolver = Arc::new(RateResolver::new(fetcher, config.resolver_config()));

    let running = GatewayServer::new(bind_address, resolver).start().await?;

    info!(
        listen_addr = %running.bound_address(),
        ttl_seconds = config.cache_ttl_seconds,
        fetch_timeout_ms = config.fetch_timeout.as_millis() as u64,
        "Gateway running"
    );

    // Set up graceful shutdown
    let shutdown = running.shutdown_token();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            return;
        }
        info!("Shutdown signal received");
        shutdown.cancel();
    });

    running.wait().await?;

    info!("Gateway shutdown complete");
    Ok(())
}
