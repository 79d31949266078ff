use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::messages::ChartResponse;
use crate::models::Quote;
use crate::services::market_data::{QuoteError, QuoteProvider};

pub const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com";

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) commotrade/0.1";

/// Fetches last price and previous close from the Yahoo Finance chart API.
pub struct YahooQuoteProvider {
    base_url: Url,
    client: Client,
}

impl YahooQuoteProvider {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, QuoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: Url, client: Client) -> Self {
        Self { base_url, client }
    }

    fn chart_url(&self, symbol: &str) -> Result<Url, QuoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| QuoteError::Decode(format!("cannot build url from {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("range", "1d")
            .append_pair("interval", "1d");
        Ok(url)
    }

    fn parse_chart(symbol: &str, body: ChartResponse) -> Result<Quote, QuoteError> {
        if let Some(err) = body.chart.error {
            debug!(
                symbol = %symbol,
                code = %err.code,
                description = err.description.as_deref().unwrap_or(""),
                "chart api returned error"
            );
            return Err(QuoteError::NoData(symbol.to_string()));
        }

        let meta = body
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .map(|r| r.meta)
            .ok_or_else(|| QuoteError::NoData(symbol.to_string()))?;

        let price = meta
            .regular_market_price
            .ok_or(QuoteError::MissingField("regularMarketPrice"))?;
        let previous_close = meta
            .chart_previous_close
            .or(meta.previous_close)
            .ok_or(QuoteError::MissingField("previousClose"))?;

        Ok(Quote::new(price, previous_close))
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    async fn get_quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        let url = self.chart_url(symbol)?;
        debug!(symbol = %symbol, url = %url, "requesting chart quote");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                QuoteError::Timeout
            } else {
                QuoteError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Status(status.as_u16()));
        }

        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| QuoteError::Decode(e.to_string()))?;

        Self::parse_chart(symbol, body)
    }
}
