//! Environment-based configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file by the binary via `dotenvy`.

use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::services::yahoo::DEFAULT_YAHOO_URL;

pub const DEFAULT_ENVIRONMENT: &str = "sandbox";
pub const DEFAULT_SYMBOLS: &str = "CL=F:Crude Oil,GC=F:Gold";
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 10;
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_METRICS_PORT: u16 = 8000;
const MIN_QUOTE_TIMEOUT_MS: u64 = 500;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("SYMBOLS must list at least one symbol")]
    NoSymbols,

    #[error("POLL_INTERVAL_SECONDS must be greater than zero")]
    ZeroInterval,
}

/// A tracked instrument and the name shown on the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolConfig {
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub symbols: Vec<SymbolConfig>,
    pub poll_interval: Duration,
    pub quote_timeout: Duration,
    pub quote_api_url: Url,
    pub port: u16,
    pub metrics_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("APP_ENV").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        let symbols = parse_symbols(
            lookup("SYMBOLS")
                .as_deref()
                .unwrap_or(DEFAULT_SYMBOLS),
        )?;

        let interval_secs: u64 = parse_or(&lookup, "POLL_INTERVAL_SECONDS", DEFAULT_POLL_INTERVAL_SECONDS)?;
        if interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        let poll_interval = Duration::from_secs(interval_secs);

        let default_timeout_ms = (interval_secs * 1000)
            .saturating_sub(1000)
            .max(MIN_QUOTE_TIMEOUT_MS);
        let timeout_ms: u64 = parse_or(&lookup, "QUOTE_TIMEOUT_MS", default_timeout_ms)?;
        let quote_timeout = Duration::from_millis(timeout_ms.max(1));

        let raw_url = lookup("QUOTE_API_URL").unwrap_or_else(|| DEFAULT_YAHOO_URL.to_string());
        let quote_api_url = Url::parse(&raw_url).map_err(|_| ConfigError::InvalidValue {
            key: "QUOTE_API_URL",
            value: raw_url.clone(),
        })?;
        if quote_api_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                key: "QUOTE_API_URL",
                value: raw_url,
            });
        }

        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let metrics_port = parse_or(&lookup, "METRICS_PORT", DEFAULT_METRICS_PORT)?;

        Ok(Self {
            environment,
            symbols,
            poll_interval,
            quote_timeout,
            quote_api_url,
            port,
            metrics_port,
        })
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "production" | "prod")
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}

/// Parse `SYMBOL[:Display Name]` entries separated by commas.
pub fn parse_symbols(raw: &str) -> Result<Vec<SymbolConfig>, ConfigError> {
    let mut symbols: Vec<SymbolConfig> = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (symbol, name) = match entry.split_once(':') {
            Some((symbol, name)) => (symbol.trim(), name.trim()),
            None => (entry, entry),
        };
        if symbol.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "SYMBOLS",
                value: entry.to_string(),
            });
        }
        if symbols.iter().any(|s| s.symbol == symbol) {
            continue;
        }
        let name = if name.is_empty() { symbol } else { name };
        symbols.push(SymbolConfig {
            symbol: symbol.to_string(),
            name: name.to_string(),
        });
    }

    if symbols.is_empty() {
        return Err(ConfigError::NoSymbols);
    }
    Ok(symbols)
}
