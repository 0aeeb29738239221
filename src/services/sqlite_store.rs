//! SQLite persistence for signals and watchlists.
//!
//! Signals are keyed by symbol and replaced in place on every fetch.
//! Indicators and watchlist members are stored as JSON text columns.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{IndicatorSet, Signal, SignalFilter, Trend, Watchlist};

/// Storage of computed signals, keyed by uppercase symbol.
pub trait SignalRepository: Send + Sync {
    /// Insert or fully replace the signal for `signal.symbol`.
    fn upsert_signal(&self, signal: &Signal) -> Result<(), StoreError>;

    fn find_signal(&self, symbol: &str) -> Result<Option<Signal>, StoreError>;

    /// Stored signals for the given symbols, in request order. Missing
    /// symbols are skipped.
    fn find_signals_by_symbols(&self, symbols: &[String]) -> Result<Vec<Signal>, StoreError>;

    /// Active signals matching `filter`, most recently fetched first.
    fn list_signals(&self, filter: &SignalFilter) -> Result<Vec<Signal>, StoreError>;

    /// Returns whether a row was removed.
    fn delete_signal(&self, symbol: &str) -> Result<bool, StoreError>;
}

pub trait WatchlistRepository: Send + Sync {
    fn insert_watchlist(&self, watchlist: &Watchlist) -> Result<(), StoreError>;

    fn get_watchlist(&self, id: Uuid) -> Result<Option<Watchlist>, StoreError>;

    /// Active watchlists, newest first.
    fn list_watchlists(&self) -> Result<Vec<Watchlist>, StoreError>;

    /// Write the user-editable fields and `updated_at`. `last_refetched` is
    /// left as stored. Returns false when no watchlist has this id.
    fn update_watchlist(&self, watchlist: &Watchlist) -> Result<bool, StoreError>;

    /// Stamp `last_refetched` and `updated_at` without touching other fields.
    fn mark_refetched(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, StoreError>;

    fn delete_watchlist(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// SQLite store for signals and watchlists.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

const SIGNAL_COLUMNS: &str = "symbol, company_name, current_price, entry_price, stop_loss,
    target_price, trend, risk_to_reward, success_probability, indicators_json, volume,
    market_cap, last_fetched, is_active";

const WATCHLIST_COLUMNS: &str =
    "id, name, description, symbols_json, is_active, last_refetched, created_at, updated_at";

impl SqliteStore {
    /// Create a new SQLite store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!("SQLite store initialized");
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    pub fn new_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        debug!("In-memory SQLite store initialized");
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS signals (
                symbol TEXT PRIMARY KEY,
                company_name TEXT NOT NULL,
                current_price REAL NOT NULL,
                entry_price REAL NOT NULL,
                stop_loss REAL NOT NULL,
                target_price REAL NOT NULL,
                trend TEXT NOT NULL,
                risk_to_reward REAL,
                success_probability INTEGER NOT NULL,
                indicators_json TEXT NOT NULL DEFAULT '{}',
                volume REAL,
                market_cap REAL NOT NULL DEFAULT 0,
                last_fetched TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_signals_last_fetched ON signals(last_fetched DESC)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS watchlists (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                symbols_json TEXT NOT NULL DEFAULT '[]',
                is_active INTEGER NOT NULL DEFAULT 1,
                last_refetched TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_watchlists_created_at ON watchlists(created_at DESC)",
            [],
        )?;

        info!("SQLite schema initialized");
        Ok(())
    }

    /// Number of stored signals, active or not.
    pub fn signal_count(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM signals", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn query_signal(conn: &Connection, symbol: &str) -> Result<Option<Signal>, StoreError> {
        let raw = conn
            .query_row(
                &format!("SELECT {} FROM signals WHERE symbol = ?1", SIGNAL_COLUMNS),
                params![symbol.to_uppercase()],
                SignalRow::from_row,
            )
            .optional()?;

        raw.map(SignalRow::into_signal).transpose()
    }
}

/// Fixed-width RFC 3339 so text ordering matches time ordering.
fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("timestamp {}: {}", value, e)))
}

/// Column values of one `signals` row before decoding.
struct SignalRow {
    symbol: String,
    company_name: String,
    current_price: f64,
    entry_price: f64,
    stop_loss: f64,
    target_price: f64,
    trend: String,
    risk_to_reward: Option<f64>,
    success_probability: i64,
    indicators_json: String,
    volume: Option<f64>,
    market_cap: f64,
    last_fetched: String,
    is_active: bool,
}

impl SignalRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            symbol: row.get(0)?,
            company_name: row.get(1)?,
            current_price: row.get(2)?,
            entry_price: row.get(3)?,
            stop_loss: row.get(4)?,
            target_price: row.get(5)?,
            trend: row.get(6)?,
            risk_to_reward: row.get(7)?,
            success_probability: row.get(8)?,
            indicators_json: row.get(9)?,
            volume: row.get(10)?,
            market_cap: row.get(11)?,
            last_fetched: row.get(12)?,
            is_active: row.get(13)?,
        })
    }

    fn into_signal(self) -> Result<Signal, StoreError> {
        let trend: Trend = self.trend.parse().map_err(StoreError::InvalidData)?;
        let indicators: IndicatorSet = serde_json::from_str(&self.indicators_json)?;
        let success_probability = u8::try_from(self.success_probability).map_err(|_| {
            StoreError::InvalidData(format!("probability {}", self.success_probability))
        })?;

        Ok(Signal {
            symbol: self.symbol,
            company_name: self.company_name,
            current_price: self.current_price,
            entry_price: self.entry_price,
            stop_loss: self.stop_loss,
            target_price: self.target_price,
            trend,
            risk_to_reward: self.risk_to_reward,
            success_probability,
            indicators,
            volume: self.volume,
            market_cap: self.market_cap,
            last_fetched: parse_time(&self.last_fetched)?,
            is_active: self.is_active,
        })
    }
}

struct WatchlistRow {
    id: String,
    name: String,
    description: String,
    symbols_json: String,
    is_active: bool,
    last_refetched: Option<String>,
    created_at: String,
    updated_at: String,
}

impl WatchlistRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            symbols_json: row.get(3)?,
            is_active: row.get(4)?,
            last_refetched: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn into_watchlist(self) -> Result<Watchlist, StoreError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::InvalidData(format!("watchlist id {}: {}", self.id, e)))?;

        Ok(Watchlist {
            id,
            name: self.name,
            description: self.description,
            stock_symbols: serde_json::from_str(&self.symbols_json)?,
            is_active: self.is_active,
            last_refetched: self.last_refetched.as_deref().map(parse_time).transpose()?,
            created_at: parse_time(&self.created_at)?,
            updated_at: parse_time(&self.updated_at)?,
        })
    }
}

impl SignalRepository for SqliteStore {
    fn upsert_signal(&self, signal: &Signal) -> Result<(), StoreError> {
        let indicators_json = serde_json::to_string(&signal.indicators)?;
        let conn = self.lock()?;

        conn.execute(
            &format!(
                "INSERT INTO signals ({})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                 ON CONFLICT(symbol) DO UPDATE SET
                    company_name = excluded.company_name,
                    current_price = excluded.current_price,
                    entry_price = excluded.entry_price,
                    stop_loss = excluded.stop_loss,
                    target_price = excluded.target_price,
                    trend = excluded.trend,
                    risk_to_reward = excluded.risk_to_reward,
                    success_probability = excluded.success_probability,
                    indicators_json = excluded.indicators_json,
                    volume = excluded.volume,
                    market_cap = excluded.market_cap,
                    last_fetched = excluded.last_fetched,
                    is_active = excluded.is_active",
                SIGNAL_COLUMNS
            ),
            params![
                signal.symbol.to_uppercase(),
                signal.company_name,
                signal.current_price,
                signal.entry_price,
                signal.stop_loss,
                signal.target_price,
                signal.trend.as_str(),
                signal.risk_to_reward,
                signal.success_probability,
                indicators_json,
                signal.volume,
                signal.market_cap,
                format_time(&signal.last_fetched),
                signal.is_active,
            ],
        )?;

        debug!("Upserted signal for {}", signal.symbol);
        Ok(())
    }

    fn find_signal(&self, symbol: &str) -> Result<Option<Signal>, StoreError> {
        let conn = self.lock()?;
        Self::query_signal(&conn, symbol)
    }

    fn find_signals_by_symbols(&self, symbols: &[String]) -> Result<Vec<Signal>, StoreError> {
        let conn = self.lock()?;
        let mut signals = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if let Some(signal) = Self::query_signal(&conn, symbol)? {
                signals.push(signal);
            }
        }
        Ok(signals)
    }

    fn list_signals(&self, filter: &SignalFilter) -> Result<Vec<Signal>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM signals WHERE is_active = 1 ORDER BY last_fetched DESC",
            SIGNAL_COLUMNS
        ))?;

        let rows = stmt
            .query_map([], SignalRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut signals = Vec::with_capacity(rows.len());
        for row in rows {
            let signal = row.into_signal()?;
            if filter.matches(&signal) {
                signals.push(signal);
            }
        }
        Ok(signals)
    }

    fn delete_signal(&self, symbol: &str) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM signals WHERE symbol = ?1",
            params![symbol.to_uppercase()],
        )?;
        Ok(removed > 0)
    }
}

impl WatchlistRepository for SqliteStore {
    fn insert_watchlist(&self, watchlist: &Watchlist) -> Result<(), StoreError> {
        let symbols_json = serde_json::to_string(&watchlist.stock_symbols)?;
        let conn = self.lock()?;

        conn.execute(
            &format!(
                "INSERT INTO watchlists ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                WATCHLIST_COLUMNS
            ),
            params![
                watchlist.id.to_string(),
                watchlist.name,
                watchlist.description,
                symbols_json,
                watchlist.is_active,
                watchlist.last_refetched.as_ref().map(format_time),
                format_time(&watchlist.created_at),
                format_time(&watchlist.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_watchlist(&self, id: Uuid) -> Result<Option<Watchlist>, StoreError> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                &format!("SELECT {} FROM watchlists WHERE id = ?1", WATCHLIST_COLUMNS),
                params![id.to_string()],
                WatchlistRow::from_row,
            )
            .optional()?;

        raw.map(WatchlistRow::into_watchlist).transpose()
    }

    fn list_watchlists(&self) -> Result<Vec<Watchlist>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM watchlists WHERE is_active = 1 ORDER BY created_at DESC",
            WATCHLIST_COLUMNS
        ))?;

        let rows = stmt
            .query_map([], WatchlistRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(WatchlistRow::into_watchlist).collect()
    }

    fn update_watchlist(&self, watchlist: &Watchlist) -> Result<bool, StoreError> {
        let symbols_json = serde_json::to_string(&watchlist.stock_symbols)?;
        let conn = self.lock()?;

        let updated = conn.execute(
            "UPDATE watchlists SET
                name = ?2, description = ?3, symbols_json = ?4, is_active = ?5, updated_at = ?6
             WHERE id = ?1",
            params![
                watchlist.id.to_string(),
                watchlist.name,
                watchlist.description,
                symbols_json,
                watchlist.is_active,
                format_time(&watchlist.updated_at),
            ],
        )?;
        Ok(updated > 0)
    }

    fn mark_refetched(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE watchlists SET last_refetched = ?2, updated_at = ?2 WHERE id = ?1",
            params![id.to_string(), format_time(&at)],
        )?;
        Ok(updated > 0)
    }

    fn delete_watchlist(&self, id: Uuid) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM watchlists WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(removed > 0)
    }
}
