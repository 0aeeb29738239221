//! Sequential rate gate for outbound provider calls.
//!
//! Enforces a minimum spacing between consecutive symbol fetches. The
//! spacing is measured from the completion of the previous operation to the
//! start of the next, so a slow request never shortens the following gap.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Calls per minute used when a caller passes zero.
pub const DEFAULT_CALLS_PER_MINUTE: u32 = 60;

#[derive(Debug)]
pub struct RateGate {
    interval: Duration,
    last_completed: Option<Instant>,
}

impl RateGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_completed: None,
        }
    }

    /// Interval of `60000 / calls_per_minute` milliseconds, never below 1ms.
    pub fn from_calls_per_minute(calls_per_minute: u32) -> Self {
        let calls = if calls_per_minute == 0 {
            DEFAULT_CALLS_PER_MINUTE
        } else {
            calls_per_minute
        };
        Self::new(Duration::from_millis((60_000 / u64::from(calls)).max(1)))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the next operation may start. Returns immediately for the
    /// first operation.
    pub async fn ready(&self) {
        let Some(last) = self.last_completed else {
            return;
        };

        let next = last + self.interval;
        if next > Instant::now() {
            debug!("Rate gate waiting {:?}", next - Instant::now());
            sleep_until(next).await;
        }
    }

    /// Record that an operation finished, successfully or not.
    pub fn mark_complete(&mut self) {
        self.last_completed = Some(Instant::now());
    }
}
