use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trend label derived from price against EMA(20) and EMA(50).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Trend {
    Uptrend,
    Downtrend,
    #[default]
    Neutral,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Uptrend => "Uptrend",
            Trend::Downtrend => "Downtrend",
            Trend::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uptrend" | "up" => Ok(Trend::Uptrend),
            "downtrend" | "down" => Ok(Trend::Downtrend),
            "neutral" => Ok(Trend::Neutral),
            _ => Err(format!("Unknown trend: {}", s)),
        }
    }
}

/// Latest MACD(12,26,9) triple.
///
/// `signal` and `histogram` stay null until 26 + 9 - 1 closes exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

/// Indicator snapshot. A null field means "not enough history".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<MacdValue>,
}

impl IndicatorSet {
    /// All-null set, used when no candle history could be obtained.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ema20.is_none() && self.ema50.is_none() && self.rsi.is_none() && self.macd.is_none()
    }
}

/// Persisted, symbol-keyed signal record.
///
/// Built whole on every successful cycle and written with a single upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub symbol: String,
    pub company_name: String,
    pub current_price: f64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub target_price: f64,
    pub trend: Trend,
    pub risk_to_reward: Option<f64>,
    pub success_probability: u8,
    pub indicators: IndicatorSet,
    pub volume: Option<f64>,
    pub market_cap: f64,
    pub last_fetched: DateTime<Utc>,
    pub is_active: bool,
}

/// Filters for listing stored signals. All bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalFilter {
    pub trend: Option<Trend>,
    pub min_risk_reward: Option<f64>,
    pub max_risk_reward: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl SignalFilter {
    /// Check a signal against the filter (active flag is checked by the store).
    pub fn matches(&self, signal: &Signal) -> bool {
        if let Some(trend) = self.trend {
            if signal.trend != trend {
                return false;
            }
        }
        if self.min_risk_reward.is_some() || self.max_risk_reward.is_some() {
            let Some(rr) = signal.risk_to_reward else {
                return false;
            };
            if self.min_risk_reward.is_some_and(|min| rr < min) {
                return false;
            }
            if self.max_risk_reward.is_some_and(|max| rr > max) {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| signal.current_price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| signal.current_price > max) {
            return false;
        }
        true
    }
}
