//! commotrade: commodity quote terminal
//!
//! Polls quotes for a fixed set of commodity symbols, derives a simple
//! BUY/SELL/HOLD signal from each one, caches the latest values and serves
//! them over a JSON terminal endpoint and a Prometheus scrape endpoint.

pub mod cache;
pub mod config;
pub mod core;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
