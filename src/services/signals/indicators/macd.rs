//! MACD (Moving Average Convergence Divergence) indicator.

use super::ema::ema_series;
use super::Indicator;
use crate::types::MacdValue;

/// MACD indicator.
///
/// Shows the relationship between two EMAs:
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = EMA(9) of MACD Line
/// - Histogram = MACD Line - Signal Line
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }

    /// Closes needed before the signal line and histogram exist.
    pub fn signal_min_periods(&self) -> usize {
        self.slow_period + self.signal_period - 1
    }

    /// MACD line at every point where the slow EMA exists.
    fn macd_line(&self, closes: &[f64]) -> Vec<f64> {
        let fast_ema = ema_series(closes, self.fast_period);
        let slow_ema = ema_series(closes, self.slow_period);

        if fast_ema.is_empty() || slow_ema.is_empty() {
            return Vec::new();
        }

        // Align the EMAs (fast starts earlier)
        let offset = self.slow_period.saturating_sub(self.fast_period);
        fast_ema
            .iter()
            .skip(offset)
            .zip(slow_ema.iter())
            .map(|(f, s)| f - s)
            .collect()
    }
}

impl Indicator for Macd {
    type Output = MacdValue;

    fn min_periods(&self) -> usize {
        self.slow_period
    }

    fn calculate(&self, closes: &[f64]) -> Option<MacdValue> {
        if closes.len() < self.min_periods() {
            return None;
        }

        let macd_line = self.macd_line(closes);
        let macd = *macd_line.last()?;

        let signal = if closes.len() >= self.signal_min_periods() {
            ema_series(&macd_line, self.signal_period).last().copied()
        } else {
            None
        };
        let histogram = signal.map(|s| macd - s);

        Some(MacdValue {
            macd,
            signal,
            histogram,
        })
    }
}
