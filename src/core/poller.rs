//! Periodic quote poller feeding the market cache and metrics

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::cache::MarketCache;
use crate::metrics::Metrics;
use crate::models::{Quote, QuoteSnapshot, Signal};
use crate::services::market_data::{validate_quote, QuoteError, QuoteProvider};
use crate::signals::engine::SignalEngine;

/// Timing configuration for the poller
#[derive(Clone, Debug)]
pub struct PollerConfig {
    /// Delay between the end of one cycle and the start of the next
    pub interval: Duration,
    /// Upper bound on a single provider call
    pub fetch_timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            fetch_timeout: Duration::from_secs(9),
        }
    }
}

/// Outcome of one pass over every tracked symbol.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub updated: Vec<String>,
    pub failed: Vec<String>,
    pub latency_ms: f64,
    pub finished_at: DateTime<Utc>,
}

/// Single writer of the [`MarketCache`].
///
/// Each cycle fetches every symbol in order, classifies it with
/// [`SignalEngine`] and stores the result. A failure for one symbol is
/// logged and leaves that symbol's previous snapshot in place.
pub struct MarketPoller {
    provider: Arc<dyn QuoteProvider>,
    cache: MarketCache,
    metrics: Arc<Metrics>,
    config: PollerConfig,
}

impl MarketPoller {
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        cache: MarketCache,
        metrics: Arc<Metrics>,
        config: PollerConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            metrics,
            config,
        }
    }

    /// Fetch, classify and store every tracked symbol once.
    pub async fn run_cycle(&self) -> CycleReport {
        let started = Instant::now();
        let mut fetched: Vec<(&str, f64, Signal)> = Vec::new();
        let mut failed = Vec::new();

        for (symbol, name) in self.cache.tracked() {
            match self.fetch_quote(symbol).await {
                Ok(quote) => {
                    let (signal, _) = SignalEngine::compute_signal(quote.price, quote.previous_close);
                    let snapshot = QuoteSnapshot::new(round_price(quote.price), signal, name.clone());
                    if let Err(e) = self.cache.update(symbol, snapshot).await {
                        error!(symbol = %symbol, error = %e, "poller: cache rejected update");
                        failed.push(symbol.clone());
                        continue;
                    }
                    debug!(
                        symbol = %symbol,
                        price = quote.price,
                        previous_close = quote.previous_close,
                        signal = %signal,
                        "poller: quote updated"
                    );
                    fetched.push((symbol.as_str(), quote.price, signal));
                }
                Err(e) => {
                    warn!(
                        symbol = %symbol,
                        error = %e,
                        data_integrity = e.is_data_integrity(),
                        "poller: quote fetch failed for {}, keeping previous snapshot",
                        symbol
                    );
                    self.metrics.record_failure(symbol);
                    failed.push(symbol.clone());
                }
            }
        }

        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.cache.set_latency(latency_ms).await;

        for (symbol, price, signal) in &fetched {
            self.metrics.record_quote(symbol, *price, *signal);
        }
        self.metrics.record_cycle(latency_ms);

        let updated: Vec<String> = fetched.iter().map(|(s, _, _)| s.to_string()).collect();
        info!(
            updated = updated.len(),
            failed = failed.len(),
            latency_ms = latency_ms,
            "poller: cycle complete"
        );

        CycleReport {
            updated,
            failed,
            latency_ms,
            finished_at: Utc::now(),
        }
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        let quote = timeout(self.config.fetch_timeout, self.provider.get_quote(symbol))
            .await
            .map_err(|_| QuoteError::Timeout)??;
        validate_quote(quote)
    }

    /// Run cycles until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_ms = self.config.interval.as_millis() as u64,
            symbols = ?self.cache.symbols().collect::<Vec<_>>(),
            "poller: started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.run_cycle().await;

            tokio::select! {
                _ = sleep(self.config.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("poller: stopped");
    }

    /// Spawn the poll loop on the runtime.
    pub fn start(self) -> PollerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            self.run(shutdown_rx).await;
        });
        PollerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle to a running poller task.
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Signal the poller to stop and wait for the in-flight cycle to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "poller: task ended abnormally");
        }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Round to cents. Exact halves round away from zero (`f64::round`), so
/// `0.125` becomes `0.13` rather than the banker's `0.12`.
fn round_price(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}
