//! Periodic refresh of every active stored signal.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::error::StoreError;
use crate::services::batch::BatchExecutor;
use crate::types::{BatchResult, SignalFilter};

pub struct RefreshScheduler {
    executor: Arc<BatchExecutor>,
    interval: Duration,
}

impl RefreshScheduler {
    pub fn new(executor: Arc<BatchExecutor>, interval: Duration) -> Self {
        Self { executor, interval }
    }

    /// Symbols of all active signals, most recently fetched first.
    pub fn active_symbols(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .executor
            .store()
            .list_signals(&SignalFilter::default())?
            .into_iter()
            .map(|s| s.symbol)
            .collect())
    }

    /// One independent batch over every active symbol.
    pub async fn refresh_once(&self) -> Result<BatchResult, StoreError> {
        let symbols = self.active_symbols()?;
        if symbols.is_empty() {
            info!("Scheduled refresh: no active signals");
            return Ok(BatchResult::default());
        }

        info!("Scheduled refresh of {} symbols", symbols.len());
        Ok(self.executor.run(&symbols).await)
    }

    /// Start the refresh loop. The first run happens one interval after start.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;

                match self.refresh_once().await {
                    Ok(result) => info!("Scheduled refresh done: {}", result.summary()),
                    Err(e) => error!("Scheduled refresh failed: {}", e),
                }
            }
        })
    }
}
