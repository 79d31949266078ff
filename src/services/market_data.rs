//! Quote provider interface for the upstream market data source.

use crate::models::Quote;
use thiserror::Error;

/// Failure fetching or validating a quote for one symbol.
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0} from quote provider")]
    Status(u16),

    #[error("malformed quote response: {0}")]
    Decode(String),

    #[error("no quote data returned for {0}")]
    NoData(String),

    #[error("quote response missing field `{0}`")]
    MissingField(&'static str),

    #[error("quote request timed out")]
    Timeout,

    #[error("previous close is zero")]
    ZeroPreviousClose,

    #[error("invalid price {0}")]
    InvalidPrice(f64),

    #[error("invalid previous close {0}")]
    InvalidPreviousClose(f64),
}

impl QuoteError {
    /// True when the provider answered but the data cannot produce a signal.
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            QuoteError::MissingField(_)
                | QuoteError::ZeroPreviousClose
                | QuoteError::InvalidPrice(_)
                | QuoteError::InvalidPreviousClose(_)
        )
    }
}

#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch last price and previous close for `symbol`.
    async fn get_quote(&self, symbol: &str) -> Result<Quote, QuoteError>;
}

/// Validate a raw quote before it is handed to the signal engine.
pub fn validate_quote(quote: Quote) -> Result<Quote, QuoteError> {
    if !quote.price.is_finite() || quote.price < 0.0 {
        return Err(QuoteError::InvalidPrice(quote.price));
    }
    if !quote.previous_close.is_finite() {
        return Err(QuoteError::InvalidPreviousClose(quote.previous_close));
    }
    if quote.previous_close == 0.0 {
        return Err(QuoteError::ZeroPreviousClose);
    }
    Ok(quote)
}
