//! Commodity terminal server
//!
//! Starts the quote poller, the terminal API and the Prometheus scrape
//! endpoint, then waits for Ctrl-C.

use commotrade::cache::MarketCache;
use commotrade::config::Config;
use commotrade::core::http::{start_metrics_server, start_server, AppState};
use commotrade::core::poller::{MarketPoller, PollerConfig};
use commotrade::logging;
use commotrade::metrics::Metrics;
use commotrade::services::YahooQuoteProvider;
use dotenvy::dotenv;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    let config = Config::from_env()?;
    logging::init_logging(&config);

    info!("Starting commodity terminal");
    info!(environment = %config.environment, "Environment");
    info!(
        symbols = ?config.symbols.iter().map(|s| s.symbol.as_str()).collect::<Vec<_>>(),
        interval_secs = config.poll_interval.as_secs(),
        "Tracking {} symbols",
        config.symbols.len()
    );

    let metrics = Arc::new(Metrics::new()?);
    let cache = MarketCache::initialize(
        config
            .symbols
            .iter()
            .map(|s| (s.symbol.clone(), s.name.clone())),
    );

    let provider = Arc::new(YahooQuoteProvider::new(
        config.quote_api_url.clone(),
        config.quote_timeout,
    )?);
    let poller = MarketPoller::new(
        provider,
        cache.clone(),
        metrics.clone(),
        PollerConfig {
            interval: config.poll_interval,
            fetch_timeout: config.quote_timeout,
        },
    );
    let poller_handle = poller.start();

    let state = AppState::new(cache, metrics.clone());
    let port = config.port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, state).await {
            error!(error = %e, "Terminal API server error");
        }
    });

    let metrics_port = config.metrics_port;
    let metrics_handle = tokio::spawn(async move {
        if let Err(e) = start_metrics_server(metrics_port, metrics).await {
            error!(error = %e, "Metrics server error");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down...");
        }
        _ = server_handle => {
            error!("Terminal API server stopped");
        }
        _ = metrics_handle => {
            error!("Metrics server stopped");
        }
    }

    poller_handle.stop().await;
    info!("Commodity terminal stopped");

    Ok(())
}
