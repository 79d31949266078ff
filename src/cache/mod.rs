//! Shared cache of the latest quote snapshot per symbol.
//!
//! The poller is the only writer. Each symbol's snapshot is replaced as a
//! whole under a short write lock, so readers see either the old or the new
//! entry and never a mix of the two.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::QuoteSnapshot;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheError {
    #[error("symbol {0} was not registered with the market cache")]
    UnknownSymbol(String),
}

#[derive(Debug, Default)]
struct FeedLatency {
    latency_ms: f64,
    recorded_at: Option<DateTime<Utc>>,
}

/// Latest snapshot for every configured symbol plus the last cycle latency.
///
/// Cheap to clone; clones share the same underlying state.
#[derive(Clone)]
pub struct MarketCache {
    tracked: Arc<Vec<(String, String)>>,
    entries: Arc<RwLock<HashMap<String, QuoteSnapshot>>>,
    latency: Arc<RwLock<FeedLatency>>,
}

impl MarketCache {
    /// Create a cache holding a zero-valued HOLD entry for each symbol.
    ///
    /// Symbols keep the order given; a repeated symbol keeps its first name.
    pub fn initialize<I, S, N>(symbols: I) -> Self
    where
        I: IntoIterator<Item = (S, N)>,
        S: Into<String>,
        N: Into<String>,
    {
        let mut tracked = Vec::new();
        let mut entries = HashMap::new();
        for (symbol, name) in symbols {
            let symbol = symbol.into();
            if entries.contains_key(&symbol) {
                continue;
            }
            let name = name.into();
            entries.insert(symbol.clone(), QuoteSnapshot::empty(name.clone()));
            tracked.push((symbol, name));
        }

        Self {
            tracked: Arc::new(tracked),
            entries: Arc::new(RwLock::new(entries)),
            latency: Arc::new(RwLock::new(FeedLatency::default())),
        }
    }

    /// Registered `(symbol, display name)` pairs in configuration order.
    pub fn tracked(&self) -> &[(String, String)] {
        &self.tracked
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.tracked.iter().map(|(symbol, _)| symbol.as_str())
    }

    /// Replace the stored snapshot for `symbol`.
    pub async fn update(&self, symbol: &str, snapshot: QuoteSnapshot) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(symbol) {
            Some(entry) => {
                *entry = snapshot;
                Ok(())
            }
            None => Err(CacheError::UnknownSymbol(symbol.to_string())),
        }
    }

    /// Record the duration of the cycle that just completed.
    pub async fn set_latency(&self, ms: f64) {
        let mut latency = self.latency.write().await;
        latency.latency_ms = ms.max(0.0);
        latency.recorded_at = Some(Utc::now());
    }

    pub async fn latency_ms(&self) -> f64 {
        self.latency.read().await.latency_ms
    }

    /// Completion time of the most recent cycle, if any has run.
    pub async fn last_cycle_at(&self) -> Option<DateTime<Utc>> {
        self.latency.read().await.recorded_at
    }

    pub async fn get(&self, symbol: &str) -> Option<QuoteSnapshot> {
        self.entries.read().await.get(symbol).cloned()
    }

    /// Point-in-time copy of every entry, keyed by symbol.
    pub async fn snapshot_all(&self) -> BTreeMap<String, QuoteSnapshot> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .map(|(symbol, snapshot)| (symbol.clone(), snapshot.clone()))
            .collect()
    }
}
