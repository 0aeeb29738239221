use std::env;
use std::fmt;
use std::str::FromStr;

use crate::services::batch::DEFAULT_HISTORY_DAYS;
use crate::services::rate_gate::DEFAULT_CALLS_PER_MINUTE;
use crate::services::signals::SignalHeuristics;

/// Path value that selects an in-memory database.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

/// Which market data backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Finnhub,
    Yahoo,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "finnhub" => Ok(ProviderKind::Finnhub),
            "yahoo" | "yahoo_finance" | "yahoofinance" => Ok(ProviderKind::Yahoo),
            other => Err(format!("Unknown market data provider: {}", other)),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Finnhub => write!(f, "finnhub"),
            ProviderKind::Yahoo => write!(f, "yahoo"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// SQLite file, or `:memory:`.
    pub database_path: String,
    pub provider: ProviderKind,
    /// Finnhub API key for stock data.
    pub finnhub_api_key: Option<String>,
    /// Outbound provider calls per minute during a batch.
    pub calls_per_minute: u32,
    /// Days of daily candles requested per symbol.
    pub history_days: i64,
    /// Background refresh period; disabled when unset.
    pub refresh_interval_secs: Option<u64>,
    pub heuristics: SignalHeuristics,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let finnhub_api_key = lookup("FINNHUB_API_KEY").filter(|k| !k.trim().is_empty());

        // Explicit choice wins; otherwise Finnhub only when a key is present
        let provider = lookup("MARKET_DATA_PROVIDER")
            .and_then(|v| v.parse().ok())
            .unwrap_or(if finnhub_api_key.is_some() {
                ProviderKind::Finnhub
            } else {
                ProviderKind::Yahoo
            });

        let calls_per_minute = lookup("API_RATE_LIMIT")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v > 0)
            .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
            .unwrap_or(DEFAULT_CALLS_PER_MINUTE);

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            database_path: lookup("DATABASE_PATH").unwrap_or_else(|| "data/signals.db".to_string()),
            provider,
            finnhub_api_key,
            calls_per_minute,
            history_days: lookup("HISTORY_DAYS")
                .and_then(|v| v.parse().ok())
                .filter(|v: &i64| *v > 0)
                .unwrap_or(DEFAULT_HISTORY_DAYS),
            refresh_interval_secs: lookup("REFRESH_INTERVAL_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|v: &u64| *v > 0),
            heuristics: SignalHeuristics::default(),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == IN_MEMORY_DATABASE
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
