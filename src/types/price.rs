use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Raw candle arrays as returned by a provider.
///
/// Arrays are parallel to `timestamps`. Any of them may be absent, and
/// individual entries may be null (Yahoo pads non-trading slots).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandlePayload {
    pub timestamps: Option<Vec<i64>>,
    pub open: Option<Vec<Option<f64>>>,
    pub high: Option<Vec<Option<f64>>>,
    pub low: Option<Vec<Option<f64>>>,
    pub close: Option<Vec<Option<f64>>>,
    pub volume: Option<Vec<Option<f64>>>,
}

/// Result of a candle request.
#[derive(Debug, Clone, PartialEq)]
pub enum CandleResponse {
    Ok(CandlePayload),
    /// Provider answered but has no history for the range (`{"s": "no_data"}`).
    NoData,
}

/// Candle resolution requested from a provider. Only daily bars feed the
/// indicator engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    #[default]
    Daily,
}

impl Resolution {
    /// Finnhub resolution code.
    pub fn finnhub_code(&self) -> &'static str {
        match self {
            Resolution::Daily => "D",
        }
    }

    /// Yahoo chart interval.
    pub fn yahoo_interval(&self) -> &'static str {
        match self {
            Resolution::Daily => "1d",
        }
    }
}

/// Latest quote for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub current_price: f64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub previous_close: Option<f64>,
    pub volume: Option<f64>,
}

/// Company enrichment data. Never fatal when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub name: String,
    pub market_cap: f64,
}

impl CompanyProfile {
    /// Fallback profile used when the provider has nothing for the symbol.
    pub fn fallback(symbol: &str) -> Self {
        Self {
            name: symbol.to_string(),
            market_cap: 0.0,
        }
    }
}
