//! Throttled batch executor.
//!
//! Runs fetch, normalize, compute, classify and persist for each symbol in
//! list order, one at a time, behind a [`RateGate`]. A failing symbol is
//! recorded in the [`BatchResult`] and never stops the rest of the batch.

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::services::rate_gate::{RateGate, DEFAULT_CALLS_PER_MINUTE};
use crate::services::series::{normalize, ClosingSeries};
use crate::services::signals::{compute_indicators, SignalClassifier, SignalHeuristics};
use crate::services::sqlite_store::SignalRepository;
use crate::sources::MarketDataProvider;
use crate::types::{
    normalize_symbol, normalize_symbols, BatchResult, CandleResponse, FailedSymbol, Resolution,
    Signal, SymbolStage,
};

/// Days of daily candles requested per symbol.
pub const DEFAULT_HISTORY_DAYS: i64 = 120;

/// Progress of one symbol through the pipeline.
struct SymbolRun<'a> {
    symbol: &'a str,
    stage: SymbolStage,
}

impl<'a> SymbolRun<'a> {
    fn new(symbol: &'a str) -> Self {
        Self {
            symbol,
            stage: SymbolStage::Pending,
        }
    }

    /// Step to the next stage on the success path.
    fn advance(&mut self) {
        if let Some(next) = self.stage.next() {
            debug!("{}: {} -> {}", self.symbol, self.stage, next);
            self.stage = next;
        }
    }

    /// Move to `Failed`, keeping the stage the error happened in.
    fn fail(self, err: PipelineError) -> FailedSymbol {
        debug_assert!(!self.stage.is_terminal());
        debug!("{}: {} -> {}", self.symbol, self.stage, SymbolStage::Failed);
        FailedSymbol {
            symbol: self.symbol.to_string(),
            stage: self.stage,
            reason: err.to_string(),
        }
    }
}

pub struct BatchExecutor {
    provider: Arc<dyn MarketDataProvider>,
    store: Arc<dyn SignalRepository>,
    classifier: SignalClassifier,
    calls_per_minute: u32,
    history_days: i64,
}

impl BatchExecutor {
    pub fn new(provider: Arc<dyn MarketDataProvider>, store: Arc<dyn SignalRepository>) -> Self {
        Self {
            provider,
            store,
            classifier: SignalClassifier::default(),
            calls_per_minute: DEFAULT_CALLS_PER_MINUTE,
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }

    pub fn with_heuristics(mut self, heuristics: SignalHeuristics) -> Self {
        self.classifier = SignalClassifier::new(heuristics);
        self
    }

    /// Zero falls back to the default rate.
    pub fn with_rate(mut self, calls_per_minute: u32) -> Self {
        self.calls_per_minute = if calls_per_minute == 0 {
            DEFAULT_CALLS_PER_MINUTE
        } else {
            calls_per_minute
        };
        self
    }

    pub fn with_history_days(mut self, days: i64) -> Self {
        self.history_days = days.max(1);
        self
    }

    pub fn calls_per_minute(&self) -> u32 {
        self.calls_per_minute
    }

    pub fn store(&self) -> &Arc<dyn SignalRepository> {
        &self.store
    }

    /// Lower bound on wall time for `count` symbols (inter-call delays only).
    pub fn estimated_duration(&self, count: usize) -> Duration {
        let gaps = count.saturating_sub(1) as u32;
        RateGate::from_calls_per_minute(self.calls_per_minute).interval() * gaps
    }

    /// Validate the request, then run the batch.
    ///
    /// An empty list, or one containing a blank symbol, is rejected before
    /// any provider call is made.
    pub async fn compute_and_persist(
        &self,
        symbols: &[String],
    ) -> Result<BatchResult, PipelineError> {
        if symbols.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "Please provide an array of stock symbols".to_string(),
            ));
        }
        let symbols = normalize_symbols(symbols).map_err(PipelineError::InvalidRequest)?;
        Ok(self.run(&symbols).await)
    }

    /// Single-symbol variant: a one-element batch unwrapped to its outcome.
    pub async fn refetch_symbol(&self, symbol: &str) -> Result<Signal, PipelineError> {
        let symbol = normalize_symbol(symbol)
            .ok_or_else(|| PipelineError::InvalidRequest("Symbol is required".to_string()))?;

        let (mut result, mut signals) = self.run_collect(std::slice::from_ref(&symbol)).await;

        if let Some(signal) = signals.pop() {
            return Ok(signal);
        }

        Err(match result.failed.pop() {
            Some(failed) => PipelineError::SymbolFailed {
                symbol: failed.symbol,
                stage: failed.stage,
                reason: failed.reason,
            },
            None => PipelineError::DataUnavailable(format!("No data available for {}", symbol)),
        })
    }

    /// Run the batch and return the aggregated report. Never fails for
    /// individual symbols; an empty list yields an empty report.
    pub async fn run(&self, symbols: &[String]) -> BatchResult {
        self.run_collect(symbols).await.0
    }

    /// Run the batch, also returning the signals that were persisted.
    pub async fn run_collect(&self, symbols: &[String]) -> (BatchResult, Vec<Signal>) {
        let total = symbols.len();
        let mut gate = RateGate::from_calls_per_minute(self.calls_per_minute);
        let mut result = BatchResult::default();
        let mut signals = Vec::with_capacity(total);

        if total > 0 {
            info!(
                "Processing {} symbols via {} at {} calls/minute",
                total,
                self.provider.name(),
                self.calls_per_minute
            );
        }

        for (i, raw) in symbols.iter().enumerate() {
            gate.ready().await;

            let symbol = raw.trim().to_uppercase();
            match self.process(&symbol).await {
                Ok(signal) => {
                    info!("[{}/{}] Successfully fetched {}", i + 1, total, symbol);
                    result.succeeded.push(symbol);
                    signals.push(signal);
                }
                Err(failed) => {
                    info!("[{}/{}] Failed to fetch {}: {}", i + 1, total, symbol, failed.reason);
                    result.failed.push(failed);
                }
            }

            gate.mark_complete();
        }

        if total > 0 {
            info!("{}", result.summary());
        }
        (result, signals)
    }

    async fn process(&self, symbol: &str) -> Result<Signal, FailedSymbol> {
        let mut run = SymbolRun::new(symbol);

        if symbol.is_empty() {
            return Err(run.fail(PipelineError::InvalidRequest("Symbol is required".to_string())));
        }

        run.advance();
        let quote = match self.provider.get_quote(symbol).await {
            Ok(quote) => quote,
            Err(e) => return Err(run.fail(e.into())),
        };
        let profile = self.provider.company_profile_or_default(symbol).await;

        let to = Utc::now();
        let from = to - ChronoDuration::days(self.history_days);
        let candles = self
            .provider
            .get_candles(symbol, Resolution::Daily, from.timestamp(), to.timestamp())
            .await;

        run.advance();
        let closes = match self.closing_series(symbol, candles) {
            Ok(closes) => closes,
            Err(e) => return Err(run.fail(e)),
        };

        run.advance();
        let indicators = compute_indicators(&closes);
        let classification = self.classifier.classify(quote.current_price, &indicators);

        let signal = Signal {
            symbol: symbol.to_string(),
            company_name: profile.name,
            current_price: quote.current_price,
            entry_price: classification.levels.entry,
            stop_loss: classification.levels.stop_loss,
            target_price: classification.levels.target,
            trend: classification.trend,
            risk_to_reward: classification.risk_to_reward,
            success_probability: classification.success_probability,
            indicators,
            volume: quote.volume,
            market_cap: profile.market_cap,
            last_fetched: Utc::now(),
            is_active: true,
        };

        run.advance();
        if let Err(e) = self.store.upsert_signal(&signal) {
            return Err(run.fail(e.into()));
        }

        run.advance();
        Ok(signal)
    }

    /// Closing prices for the indicator engine.
    ///
    /// Missing history degrades to an empty series (all indicators null).
    /// Arrays that are present but inconsistent fail the symbol.
    fn closing_series(
        &self,
        symbol: &str,
        candles: Result<CandleResponse, crate::error::ProviderError>,
    ) -> Result<ClosingSeries, PipelineError> {
        let payload = match candles {
            Ok(CandleResponse::Ok(payload)) => payload,
            Ok(CandleResponse::NoData) => {
                debug!("No candle data for {}, using quote data only", symbol);
                return Ok(ClosingSeries::default());
            }
            Err(e) => {
                warn!("Could not fetch candles for {}, using quote data only: {}", symbol, e);
                return Ok(ClosingSeries::default());
            }
        };

        match normalize(&payload) {
            Ok(points) => Ok(ClosingSeries::from_points(&points)),
            Err(PipelineError::DataUnavailable(reason)) => {
                debug!("Empty candle series for {}: {}", symbol, reason);
                Ok(ClosingSeries::default())
            }
            Err(e) => Err(e),
        }
    }
}
