//! Trend classification, trade levels and the success-probability scorer.
//!
//! The percentage offsets and scoring weights are fixed heuristics, not
//! fitted parameters. They live in [`SignalHeuristics`] so they can be
//! tuned or tested in isolation.

use serde::{Deserialize, Serialize};

use crate::types::{IndicatorSet, Trend};

/// Named constants for the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalHeuristics {
    /// stopLoss = currentPrice * stop_loss_multiplier
    pub stop_loss_multiplier: f64,
    /// targetPrice = currentPrice * target_multiplier
    pub target_multiplier: f64,
    pub base_probability: i32,
    /// Added for Uptrend, subtracted for Downtrend.
    pub trend_weight: i32,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Added when oversold, subtracted when overbought.
    pub rsi_extreme_weight: i32,
    pub rsi_neutral_low: f64,
    pub rsi_neutral_high: f64,
    pub rsi_neutral_weight: i32,
    pub rr_excellent: f64,
    pub rr_excellent_weight: i32,
    pub rr_good: f64,
    pub rr_good_weight: i32,
    pub rr_poor: f64,
    /// Subtracted when risk-to-reward is below `rr_poor`.
    pub rr_poor_penalty: i32,
}

impl Default for SignalHeuristics {
    fn default() -> Self {
        Self {
            stop_loss_multiplier: 0.95,
            target_multiplier: 1.10,
            base_probability: 50,
            trend_weight: 15,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            rsi_extreme_weight: 10,
            rsi_neutral_low: 40.0,
            rsi_neutral_high: 60.0,
            rsi_neutral_weight: 5,
            rr_excellent: 3.0,
            rr_excellent_weight: 10,
            rr_good: 2.0,
            rr_good_weight: 5,
            rr_poor: 1.0,
            rr_poor_penalty: 10,
        }
    }
}

/// Entry, stop and target prices for a proposed trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeLevels {
    pub entry: f64,
    pub stop_loss: f64,
    pub target: f64,
}

/// Everything the classifier derives for one symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub trend: Trend,
    pub levels: TradeLevels,
    pub risk_to_reward: Option<f64>,
    pub success_probability: u8,
}

/// Uptrend when price > EMA20 > EMA50, Downtrend when price < EMA20 < EMA50,
/// Neutral otherwise (including any missing EMA).
pub fn classify_trend(current_price: f64, ema20: Option<f64>, ema50: Option<f64>) -> Trend {
    let (Some(ema20), Some(ema50)) = (ema20, ema50) else {
        return Trend::Neutral;
    };

    if current_price > ema20 && ema20 > ema50 {
        Trend::Uptrend
    } else if current_price < ema20 && ema20 < ema50 {
        Trend::Downtrend
    } else {
        Trend::Neutral
    }
}

/// reward / risk rounded to 2 decimals; `None` when risk is zero.
pub fn risk_to_reward(levels: &TradeLevels) -> Option<f64> {
    let risk = (levels.entry - levels.stop_loss).abs();
    let reward = (levels.target - levels.entry).abs();

    if risk == 0.0 {
        return None;
    }

    let ratio = reward / risk;
    if !ratio.is_finite() {
        return None;
    }
    Some((ratio * 100.0).round() / 100.0)
}

#[derive(Debug, Clone, Default)]
pub struct SignalClassifier {
    heuristics: SignalHeuristics,
}

impl SignalClassifier {
    pub fn new(heuristics: SignalHeuristics) -> Self {
        Self { heuristics }
    }

    /// Fixed-offset trade levels around the current price.
    pub fn trade_levels(&self, current_price: f64) -> TradeLevels {
        TradeLevels {
            entry: current_price,
            stop_loss: current_price * self.heuristics.stop_loss_multiplier,
            target: current_price * self.heuristics.target_multiplier,
        }
    }

    /// Fixed-weight score in `[0, 100]`.
    pub fn success_probability(
        &self,
        trend: Trend,
        rsi: Option<f64>,
        risk_to_reward: Option<f64>,
    ) -> u8 {
        let h = &self.heuristics;
        let mut score = h.base_probability;

        score += match trend {
            Trend::Uptrend => h.trend_weight,
            Trend::Downtrend => -h.trend_weight,
            Trend::Neutral => 0,
        };

        if let Some(rsi) = rsi {
            if rsi < h.rsi_oversold {
                score += h.rsi_extreme_weight;
            } else if rsi > h.rsi_overbought {
                score -= h.rsi_extreme_weight;
            } else if rsi >= h.rsi_neutral_low && rsi <= h.rsi_neutral_high {
                score += h.rsi_neutral_weight;
            }
        }

        if let Some(rr) = risk_to_reward {
            if rr >= h.rr_excellent {
                score += h.rr_excellent_weight;
            } else if rr >= h.rr_good {
                score += h.rr_good_weight;
            } else if rr < h.rr_poor {
                score -= h.rr_poor_penalty;
            }
        }

        score.clamp(0, 100) as u8
    }

    pub fn classify(&self, current_price: f64, indicators: &IndicatorSet) -> Classification {
        let trend = classify_trend(current_price, indicators.ema20, indicators.ema50);
        let levels = self.trade_levels(current_price);
        let risk_to_reward = risk_to_reward(&levels);
        let success_probability = self.success_probability(trend, indicators.rsi, risk_to_reward);

        Classification {
            trend,
            levels,
            risk_to_reward,
            success_probability,
        }
    }
}
