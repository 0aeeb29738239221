//! Finnhub API client for stock quotes, profiles and daily candles.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::MarketDataProvider;
use crate::error::ProviderError;
use crate::types::{CandlePayload, CandleResponse, CompanyProfile, Quote, Resolution};

pub const FINNHUB_URL: &str = "https://finnhub.io/api/v1";

/// Finnhub quote response.
#[derive(Debug, Clone, Deserialize)]
pub struct FinnhubQuote {
    /// Current price
    #[serde(rename = "c")]
    pub current: Option<f64>,
    /// High price of the day
    #[serde(rename = "h")]
    pub high: Option<f64>,
    /// Low price of the day
    #[serde(rename = "l")]
    pub low: Option<f64>,
    /// Open price of the day
    #[serde(rename = "o")]
    pub open: Option<f64>,
    /// Previous close price
    #[serde(rename = "pc")]
    pub previous_close: Option<f64>,
    #[serde(rename = "v")]
    pub volume: Option<f64>,
}

/// Finnhub company profile. Market cap is reported in millions.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinnhubProfile {
    pub name: Option<String>,
    pub market_capitalization: Option<f64>,
    pub ticker: Option<String>,
}

/// Finnhub candle response (`s` is `"ok"` or `"no_data"`).
#[derive(Debug, Clone, Deserialize)]
pub struct FinnhubCandles {
    #[serde(rename = "s")]
    pub status: String,
    #[serde(rename = "t")]
    pub timestamps: Option<Vec<i64>>,
    #[serde(rename = "o")]
    pub open: Option<Vec<Option<f64>>>,
    #[serde(rename = "h")]
    pub high: Option<Vec<Option<f64>>>,
    #[serde(rename = "l")]
    pub low: Option<Vec<Option<f64>>>,
    #[serde(rename = "c")]
    pub close: Option<Vec<Option<f64>>>,
    #[serde(rename = "v")]
    pub volume: Option<Vec<Option<f64>>>,
}

impl FinnhubQuote {
    fn into_quote(self, symbol: &str) -> Result<Quote, ProviderError> {
        let current_price = match self.current {
            Some(price) if price != 0.0 => price,
            _ => return Err(ProviderError::NoData(format!("No data available for {}", symbol))),
        };

        Ok(Quote {
            current_price,
            open: self.open,
            high: self.high,
            low: self.low,
            previous_close: self.previous_close,
            volume: self.volume,
        })
    }
}

impl FinnhubProfile {
    fn into_profile(self, symbol: &str) -> CompanyProfile {
        CompanyProfile {
            name: self
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| symbol.to_string()),
            market_cap: self.market_capitalization.unwrap_or(0.0) * 1_000_000.0,
        }
    }
}

impl From<FinnhubCandles> for CandleResponse {
    fn from(candles: FinnhubCandles) -> Self {
        if candles.status != "ok" {
            return CandleResponse::NoData;
        }
        CandleResponse::Ok(CandlePayload {
            timestamps: candles.timestamps,
            open: candles.open,
            high: candles.high,
            low: candles.low,
            close: candles.close,
            volume: candles.volume,
        })
    }
}

/// Finnhub API client.
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FinnhubClient {
    /// Create a new Finnhub client.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, FINNHUB_URL)
    }

    /// Client pointed at an alternative host.
    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Fetching Finnhub data: {}", url);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl MarketDataProvider for FinnhubClient {
    fn name(&self) -> &'static str {
        "finnhub"
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, ProviderError> {
        let quote: FinnhubQuote = self
            .get_json("/quote", &[("symbol", symbol.to_string())])
            .await?;
        quote.into_quote(symbol)
    }

    async fn get_company_profile(&self, symbol: &str) -> Result<CompanyProfile, ProviderError> {
        let profile: FinnhubProfile = self
            .get_json("/stock/profile2", &[("symbol", symbol.to_string())])
            .await?;
        Ok(profile.into_profile(symbol))
    }

    async fn get_candles(
        &self,
        symbol: &str,
        resolution: Resolution,
        from: i64,
        to: i64,
    ) -> Result<CandleResponse, ProviderError> {
        let candles: FinnhubCandles = self
            .get_json(
                "/stock/candle",
                &[
                    ("symbol", symbol.to_string()),
                    ("resolution", resolution.finnhub_code().to_string()),
                    ("from", from.to_string()),
                    ("to", to.to_string()),
                ],
            )
            .await?;
        Ok(candles.into())
    }
}
