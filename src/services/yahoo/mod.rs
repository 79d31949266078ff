//! Yahoo Finance chart API quote provider

mod client;
mod messages;

pub use client::{YahooQuoteProvider, DEFAULT_YAHOO_URL};
pub use messages::{ChartError, ChartMeta, ChartResponse, ChartResult, ChartResultSet};
