//! Technical indicator implementations.

pub mod ema;
pub mod macd;
pub mod rsi;

pub use ema::Ema;
pub use macd::Macd;
pub use rsi::Rsi;

use crate::services::series::ClosingSeries;
use crate::types::IndicatorSet;

/// Trait for implementing technical indicators over closing prices.
pub trait Indicator: Send + Sync {
    type Output;

    /// Minimum number of closes required for calculation.
    fn min_periods(&self) -> usize;

    /// Latest indicator value, or `None` when history is too short.
    fn calculate(&self, closes: &[f64]) -> Option<Self::Output>;
}

/// Compute EMA(20), EMA(50), RSI(14) and MACD(12,26,9) for a closing series.
pub fn compute_indicators(closes: &ClosingSeries) -> IndicatorSet {
    let values = closes.as_slice();
    IndicatorSet {
        ema20: Ema::new(20).calculate(values),
        ema50: Ema::new(50).calculate(values),
        rsi: Rsi::default().calculate(values),
        macd: Macd::default().calculate(values),
    }
}
