//! External market data services.

pub mod market_data;
pub mod yahoo;

pub use market_data::{validate_quote, QuoteError, QuoteProvider};
pub use yahoo::YahooQuoteProvider;
