//! Shared data models spanning the engine layers.

pub mod quote;

pub use quote::{Quote, QuoteSnapshot, Signal};
