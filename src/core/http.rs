//! HTTP endpoint servers using Axum
//!
//! Two listeners share the process: the terminal API (`/terminal`,
//! `/health`) and the Prometheus scrape endpoint (`/metrics`).

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::cache::MarketCache;
use crate::metrics::Metrics;
use crate::models::QuoteSnapshot;

pub const FEED_SOURCE: &str = "Yahoo Finance (Simulated Bloomberg Pipe)";

pub const NEWS_TICKER: [&str; 3] = [
    "OPEC meets tomorrow to discuss supply cuts",
    "Gold rallies as inflation data causes concern",
    "Tech stocks volatile ahead of earnings",
];

/// Static content served alongside the market data.
#[derive(Clone, Debug)]
pub struct TerminalInfo {
    pub feed_source: String,
    pub news_ticker: Vec<String>,
}

impl Default for TerminalInfo {
    fn default() -> Self {
        Self {
            feed_source: FEED_SOURCE.to_string(),
            news_ticker: NEWS_TICKER.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub cache: MarketCache,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub terminal: Arc<TerminalInfo>,
}

impl AppState {
    pub fn new(cache: MarketCache, metrics: Arc<Metrics>) -> Self {
        Self {
            cache,
            metrics,
            start_time: Arc::new(Instant::now()),
            terminal: Arc::new(TerminalInfo::default()),
        }
    }

    pub fn with_terminal_info(mut self, terminal: TerminalInfo) -> Self {
        self.terminal = Arc::new(terminal);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct TerminalResponse {
    pub status: &'static str,
    pub feed_source: String,
    pub market_data: BTreeMap<String, QuoteSnapshot>,
    pub news_ticker: Vec<String>,
}

/// Latest cached market data for a terminal frontend.
pub async fn terminal_view(State(state): State<AppState>) -> Json<TerminalResponse> {
    let market_data = state.cache.snapshot_all().await;
    Json(TerminalResponse {
        status: "connected",
        feed_source: state.terminal.feed_source.clone(),
        market_data,
        news_ticker: state.terminal.news_ticker.clone(),
    })
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let uptime_seconds = state.start_time.elapsed().as_secs();
    let last_cycle_at = state.cache.last_cycle_at().await.map(|t| t.to_rfc3339());
    Json(json!({
        "status": "healthy",
        "uptime_seconds": uptime_seconds,
        "service": "commotrade-terminal",
        "last_cycle_at": last_cycle_at,
    }))
}

pub async fn metrics_handler(State(metrics): State<Arc<Metrics>>) -> Result<String, StatusCode> {
    metrics.export().map_err(|e| {
        error!(error = %e, "Failed to encode metrics");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    state.metrics.http_requests_in_flight.dec();

    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis() as u64,
            "HTTP request error"
        );
    }

    response
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/terminal", get(terminal_view))
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub fn create_metrics_router(metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
}

pub async fn start_server(port: u16, state: AppState) -> std::io::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;

    info!(port = port, "Terminal API listening on http://0.0.0.0:{}/terminal", port);
    axum::serve(listener, app).await
}

pub async fn start_metrics_server(port: u16, metrics: Arc<Metrics>) -> std::io::Result<()> {
    let app = create_metrics_router(metrics);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;

    info!(port = port, "Metrics endpoint available at http://0.0.0.0:{}/metrics", port);
    axum::serve(listener, app).await
}
