//! Signal evaluation from a single quote.

use crate::models::Signal;

/// Percentage move at which a quote stops being a HOLD.
pub const SIGNAL_THRESHOLD_PCT: f64 = 0.5;

pub struct SignalEngine;

impl SignalEngine {
    /// Classify `price` against `previous_close`.
    ///
    /// A drop of more than 0.5% is a BUY, a rise of more than 0.5% is a SELL,
    /// anything inside `[-0.5, 0.5]` is a HOLD. Callers must reject a zero
    /// `previous_close` before calling.
    pub fn compute_signal(price: f64, previous_close: f64) -> (Signal, i32) {
        let change_pct = Self::change_pct(price, previous_close);
        let signal = if change_pct < -SIGNAL_THRESHOLD_PCT {
            Signal::Buy
        } else if change_pct > SIGNAL_THRESHOLD_PCT {
            Signal::Sell
        } else {
            Signal::Hold
        };
        (signal, signal.value())
    }

    pub fn change_pct(price: f64, previous_close: f64) -> f64 {
        (price - previous_close) / previous_close * 100.0
    }
}
