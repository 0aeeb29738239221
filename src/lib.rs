//! Swing Scanner - technical signal computation and rate-limited ingestion
//! for equity watchlists.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use std::sync::Arc;

use config::Config;
use services::{BatchExecutor, SignalRepository, WatchlistService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub executor: Arc<BatchExecutor>,
    pub signals: Arc<dyn SignalRepository>,
    pub watchlists: Arc<WatchlistService>,
}
