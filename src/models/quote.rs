use serde::{Deserialize, Serialize};

/// Raw quote returned by a [`QuoteProvider`](crate::services::market_data::QuoteProvider).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub price: f64,
    pub previous_close: f64,
}

impl Quote {
    pub fn new(price: f64, previous_close: f64) -> Self {
        Self {
            price,
            previous_close,
        }
    }
}

/// Trade recommendation derived from the move against previous close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Signal {
    /// Gauge value exported as `trade_signal`: 1 = BUY, -1 = SELL, 0 = HOLD.
    pub fn value(self) -> i32 {
        match self {
            Signal::Buy => 1,
            Signal::Sell => -1,
            Signal::Hold => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest known state of one symbol, as served by the terminal endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub price: f64,
    pub signal: Signal,
    pub name: String,
}

impl QuoteSnapshot {
    /// Sentinel entry held until the first successful fetch.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            price: 0.0,
            signal: Signal::Hold,
            name: name.into(),
        }
    }

    pub fn new(price: f64, signal: Signal, name: impl Into<String>) -> Self {
        Self {
            price,
            signal,
            name: name.into(),
        }
    }
}
