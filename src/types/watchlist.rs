use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Signal;

/// A named group of symbols. Only `stock_symbols` is owned; member
/// signals are resolved from the signal store at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Watchlist {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub stock_symbols: Vec<String>,
    pub is_active: bool,
    pub last_refetched: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Watchlist with its member signals resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistView {
    #[serde(flatten)]
    pub watchlist: Watchlist,
    pub member_signals: Vec<Signal>,
}

/// Request body for creating a watchlist.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWatchlist {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock_symbols: Vec<String>,
}

/// Partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWatchlist {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stock_symbols: Option<Vec<String>>,
}

/// Normalize a single symbol: trimmed and uppercased. Empty input yields `None`.
pub fn normalize_symbol(symbol: &str) -> Option<String> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Normalize a symbol list into an ordered set: uppercase, first occurrence wins.
pub fn normalize_symbols<S: AsRef<str>>(symbols: &[S]) -> Result<Vec<String>, String> {
    let mut out: Vec<String> = Vec::with_capacity(symbols.len());
    for raw in symbols {
        let symbol = normalize_symbol(raw.as_ref())
            .ok_or_else(|| "Stock symbols must not be empty".to_string())?;
        if !out.contains(&symbol) {
            out.push(symbol);
        }
    }
    Ok(out)
}
