//! Prometheus metrics for the quote feed and the terminal HTTP server.

use prometheus::{
    Encoder, Gauge, GaugeVec, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

use crate::models::Signal;

/// Metric registry scraped on the metrics port.
///
/// `commodity_price`, `trade_signal` and `data_latency_ms` keep their names
/// and labels stable for existing dashboards.
pub struct Metrics {
    registry: Registry,
    pub commodity_price: GaugeVec,
    pub trade_signal: GaugeVec,
    pub data_latency_ms: Gauge,
    pub quote_fetch_failures_total: IntCounterVec,
    pub poll_cycles_total: IntCounter,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let commodity_price = GaugeVec::new(
            Opts::new("commodity_price", "Real-time market price"),
            &["symbol"],
        )?;
        let trade_signal = GaugeVec::new(
            Opts::new("trade_signal", "1=BUY, -1=SELL, 0=HOLD"),
            &["symbol"],
        )?;
        let data_latency_ms = Gauge::new("data_latency_ms", "Feed latency in ms")?;
        let quote_fetch_failures_total = IntCounterVec::new(
            Opts::new(
                "quote_fetch_failures_total",
                "Quote fetches that failed or returned unusable data",
            ),
            &["symbol"],
        )?;
        let poll_cycles_total =
            IntCounter::new("poll_cycles_total", "Completed quote poll cycles")?;
        let http_requests_total =
            IntCounter::new("http_requests_total", "Total HTTP requests served")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests currently being served")?;

        registry.register(Box::new(commodity_price.clone()))?;
        registry.register(Box::new(trade_signal.clone()))?;
        registry.register(Box::new(data_latency_ms.clone()))?;
        registry.register(Box::new(quote_fetch_failures_total.clone()))?;
        registry.register(Box::new(poll_cycles_total.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;

        Ok(Self {
            registry,
            commodity_price,
            trade_signal,
            data_latency_ms,
            quote_fetch_failures_total,
            poll_cycles_total,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
        })
    }

    pub fn record_quote(&self, symbol: &str, price: f64, signal: Signal) {
        self.commodity_price.with_label_values(&[symbol]).set(price);
        self.trade_signal
            .with_label_values(&[symbol])
            .set(f64::from(signal.value()));
    }

    pub fn record_failure(&self, symbol: &str) {
        self.quote_fetch_failures_total
            .with_label_values(&[symbol])
            .inc();
    }

    pub fn record_cycle(&self, latency_ms: f64) {
        self.data_latency_ms.set(latency_ms);
        self.poll_cycles_total.inc();
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
