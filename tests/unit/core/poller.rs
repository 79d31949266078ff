//! Unit tests for the market poller

#[path = "test_utils.rs"]
mod test_utils;

use std::sync::Arc;

use commotrade::cache::MarketCache;
use commotrade::core::poller::{MarketPoller, PollerConfig};
use commotrade::metrics::Metrics;
use commotrade::models::{QuoteSnapshot, Signal};
use tokio::time::Duration;

use test_utils::{ScriptedProvider, Step};

struct Harness {
    provider: Arc<ScriptedProvider>,
    cache: MarketCache,
    metrics: Arc<Metrics>,
    poller: MarketPoller,
}

fn harness(provider: ScriptedProvider, config: PollerConfig) -> Harness {
    let provider = Arc::new(provider);
    let cache = MarketCache::initialize([("CL=F", "Crude Oil"), ("GC=F", "Gold")]);
    let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
    let poller = MarketPoller::new(provider.clone(), cache.clone(), metrics.clone(), config);
    Harness {
        provider,
        cache,
        metrics,
        poller,
    }
}

#[test]
fn test_poller_config_default() {
    let config = PollerConfig::default();
    assert_eq!(config.interval, Duration::from_secs(10));
    assert!(config.fetch_timeout < config.interval);
}

#[tokio::test]
async fn test_cycle_updates_every_symbol() {
    let h = harness(
        ScriptedProvider::new()
            .with("CL=F", Step::Quote(70.456, 71.5))
            .with("GC=F", Step::Quote(2410.0, 2400.0)),
        PollerConfig::default(),
    );

    let report = h.poller.run_cycle().await;

    assert_eq!(report.updated, vec!["CL=F", "GC=F"]);
    assert!(report.failed.is_empty());
    assert!(report.latency_ms >= 0.0);

    let all = h.cache.snapshot_all().await;
    assert_eq!(all["CL=F"], QuoteSnapshot::new(70.46, Signal::Buy, "Crude Oil"));
    assert_eq!(all["GC=F"].signal, Signal::Hold);
    assert_eq!(all["GC=F"].price, 2410.0);
    assert_eq!(h.provider.call_order(), vec!["CL=F", "GC=F"]);
}

#[tokio::test]
async fn test_failed_symbol_keeps_previous_snapshot() {
    let h = harness(
        ScriptedProvider::new()
            .with("CL=F", Step::Quote(70.0, 70.0))
            .with("GC=F", Step::Quote(2450.0, 2400.0)),
        PollerConfig::default(),
    );
    h.poller.run_cycle().await;

    h.provider.set("CL=F", Step::Quote(75.0, 70.0));
    h.provider.set("GC=F", Step::NotFound);
    let report = h.poller.run_cycle().await;

    assert_eq!(report.updated, vec!["CL=F"]);
    assert_eq!(report.failed, vec!["GC=F"]);

    let all = h.cache.snapshot_all().await;
    assert_eq!(all.len(), 2);
    assert_eq!(all["CL=F"], QuoteSnapshot::new(75.0, Signal::Sell, "Crude Oil"));
    assert_eq!(all["GC=F"], QuoteSnapshot::new(2450.0, Signal::Sell, "Gold"));
}

#[tokio::test]
async fn test_zero_previous_close_is_treated_as_failure() {
    let h = harness(
        ScriptedProvider::new()
            .with("CL=F", Step::Quote(70.0, 0.0))
            .with("GC=F", Step::MissingPrice),
        PollerConfig::default(),
    );

    let report = h.poller.run_cycle().await;

    assert!(report.updated.is_empty());
    assert_eq!(report.failed, vec!["CL=F", "GC=F"]);
    let all = h.cache.snapshot_all().await;
    assert_eq!(all["CL=F"], QuoteSnapshot::new(0.0, Signal::Hold, "Crude Oil"));
    assert_eq!(all["GC=F"], QuoteSnapshot::new(0.0, Signal::Hold, "Gold"));
}

#[tokio::test]
async fn test_negative_price_is_rejected() {
    let h = harness(
        ScriptedProvider::new()
            .with("CL=F", Step::Quote(-37.63, 18.27))
            .with("GC=F", Step::Quote(2400.0, 2400.0)),
        PollerConfig::default(),
    );

    let report = h.poller.run_cycle().await;

    assert_eq!(report.failed, vec!["CL=F"]);
    assert_eq!(h.cache.get("CL=F").await.unwrap().price, 0.0);
}

#[tokio::test]
async fn test_all_failures_still_record_latency() {
    let h = harness(ScriptedProvider::new(), PollerConfig::default());

    let report = h.poller.run_cycle().await;

    assert_eq!(report.failed.len(), 2);
    assert!(h.cache.last_cycle_at().await.is_some());
    assert!(h.cache.latency_ms().await >= 0.0);

    let body = h.metrics.export().unwrap();
    assert!(body.contains("data_latency_ms"));
    assert!(body.contains("quote_fetch_failures_total{symbol=\"CL=F\"} 1"));
    assert!(body.contains("quote_fetch_failures_total{symbol=\"GC=F\"} 1"));
    assert!(!body.contains("commodity_price{"));
}

#[tokio::test]
async fn test_metrics_receive_raw_price_and_signal() {
    let h = harness(
        ScriptedProvider::new()
            .with("CL=F", Step::Quote(70.456, 71.5))
            .with("GC=F", Step::NotFound),
        PollerConfig::default(),
    );

    h.poller.run_cycle().await;

    let body = h.metrics.export().unwrap();
    assert!(body.contains("commodity_price{symbol=\"CL=F\"} 70.456"));
    assert!(body.contains("trade_signal{symbol=\"CL=F\"} 1"));
    assert!(!body.contains("commodity_price{symbol=\"GC=F\"}"));
    assert!(body.contains("poll_cycles_total 1"));
}

#[tokio::test(start_paused = true)]
async fn test_hung_provider_is_bounded_by_timeout() {
    let h = harness(
        ScriptedProvider::new()
            .with("CL=F", Step::Hang(Duration::from_secs(60)))
            .with("GC=F", Step::Quote(2400.0, 2400.0)),
        PollerConfig {
            interval: Duration::from_secs(10),
            fetch_timeout: Duration::from_secs(2),
        },
    );

    let report = h.poller.run_cycle().await;

    assert_eq!(report.failed, vec!["CL=F"]);
    assert_eq!(report.updated, vec!["GC=F"]);
    assert!(report.latency_ms >= 2000.0);
    assert!(report.latency_ms < 10_000.0);
    assert_eq!(h.cache.get("GC=F").await.unwrap().signal, Signal::Hold);
}

#[tokio::test(start_paused = true)]
async fn test_run_repeats_after_interval_until_stopped() {
    let h = harness(
        ScriptedProvider::new()
            .with("CL=F", Step::Quote(70.0, 71.0))
            .with("GC=F", Step::Quote(2400.0, 2400.0)),
        PollerConfig {
            interval: Duration::from_secs(10),
            fetch_timeout: Duration::from_secs(9),
        },
    );
    let provider = h.provider.clone();
    let metrics = h.metrics.clone();
    let cache = h.cache.clone();

    let handle = h.poller.start();
    assert!(handle.is_running());

    // Cycles start at t=0, t=10 and t=20.
    tokio::time::sleep(Duration::from_secs(25)).await;
    assert_eq!(provider.calls(), 6);
    assert!(metrics.export().unwrap().contains("poll_cycles_total 3"));
    assert_eq!(cache.get("CL=F").await.unwrap().signal, Signal::Buy);

    handle.stop().await;
    let calls_at_stop = provider.calls();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(provider.calls(), calls_at_stop);
}

#[tokio::test(start_paused = true)]
async fn test_interval_starts_after_slow_cycle_finishes() {
    let h = harness(
        ScriptedProvider::new()
            .with("CL=F", Step::Hang(Duration::from_secs(5)))
            .with("GC=F", Step::Quote(2400.0, 2400.0)),
        PollerConfig {
            interval: Duration::from_secs(10),
            fetch_timeout: Duration::from_secs(9),
        },
    );
    let provider = h.provider.clone();
    let metrics = h.metrics.clone();

    let handle = h.poller.start();

    // First cycle runs t=0..5, so the next one starts at t=15, not t=10.
    tokio::time::sleep(Duration::from_secs(14)).await;
    assert_eq!(provider.calls(), 2);
    assert!(metrics.export().unwrap().contains("poll_cycles_total 1"));

    // Second cycle runs t=15..20; the third is not due until t=30.
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(provider.calls(), 4);
    assert!(metrics.export().unwrap().contains("poll_cycles_total 2"));

    handle.stop().await;
}
