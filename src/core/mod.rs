//! Core application primitives (poller, HTTP servers)

pub mod http;
pub mod poller;

pub use http::*;
pub use poller::*;
