//! Yahoo Finance chart API client.
//!
//! Quotes, profile names and historical candles all come from the
//! unofficial chart endpoint. Market cap is not available there and is
//! always reported as zero.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::MarketDataProvider;
use crate::error::ProviderError;
use crate::types::{CandlePayload, CandleResponse, CompanyProfile, Quote, Resolution};

pub const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: YahooMeta,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    regular_market_price: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    long_name: Option<String>,
    short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

fn first(values: &Option<Vec<Option<f64>>>) -> Option<f64> {
    values.as_ref().and_then(|v| v.first().copied().flatten())
}

impl YahooChartResponse {
    /// First chart result, or the reason there is none.
    fn into_result(self, symbol: &str) -> Result<YahooResult, ProviderError> {
        if let Some(error) = self.chart.error {
            return Err(ProviderError::NoData(format!(
                "Yahoo API error for {}: {} - {}",
                symbol, error.code, error.description
            )));
        }

        self.chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| ProviderError::NoData(format!("No data available for {}", symbol)))
    }
}

impl YahooResult {
    fn first_quote(&self) -> Option<&YahooQuote> {
        self.indicators.quote.first()
    }

    fn into_quote(self, symbol: &str) -> Result<Quote, ProviderError> {
        let current_price = self
            .meta
            .regular_market_price
            .ok_or_else(|| ProviderError::NoData(format!("No data available for {}", symbol)))?;

        let bar = self.first_quote();
        Ok(Quote {
            current_price,
            open: bar.and_then(|q| first(&q.open)),
            high: self
                .meta
                .regular_market_day_high
                .or_else(|| bar.and_then(|q| first(&q.high))),
            low: self
                .meta
                .regular_market_day_low
                .or_else(|| bar.and_then(|q| first(&q.low))),
            previous_close: self.meta.previous_close.or(self.meta.chart_previous_close),
            volume: self
                .meta
                .regular_market_volume
                .or_else(|| bar.and_then(|q| first(&q.volume))),
        })
    }

    fn into_profile(self, symbol: &str) -> CompanyProfile {
        CompanyProfile {
            name: self
                .meta
                .long_name
                .or(self.meta.short_name)
                .unwrap_or_else(|| symbol.to_string()),
            market_cap: 0.0,
        }
    }

    fn into_candles(self) -> CandleResponse {
        let Some(timestamps) = self.timestamp else {
            return CandleResponse::NoData;
        };

        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();
        CandleResponse::Ok(CandlePayload {
            timestamps: Some(timestamps),
            open: quote.open,
            high: quote.high,
            low: quote.low,
            close: quote.close,
            volume: quote.volume,
        })
    }
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client.
    pub fn new() -> Self {
        Self::with_base_url(YAHOO_CHART_URL)
    }

    /// Client pointed at an alternative chart endpoint.
    pub fn with_base_url(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn chart(
        &self,
        symbol: &str,
        params: &[(&str, String)],
    ) -> Result<YahooChartResponse, ProviderError> {
        let url = format!("{}/{}", self.base_url, symbol);
        debug!("Fetching Yahoo Finance data: {}", url);

        let response = self.client.get(&url).query(params).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        Ok(response.json::<YahooChartResponse>().await?)
    }

    async fn latest_day(&self, symbol: &str) -> Result<YahooResult, ProviderError> {
        self.chart(
            symbol,
            &[("interval", "1d".to_string()), ("range", "1d".to_string())],
        )
        .await?
        .into_result(symbol)
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, ProviderError> {
        self.latest_day(symbol).await?.into_quote(symbol)
    }

    async fn get_company_profile(&self, symbol: &str) -> Result<CompanyProfile, ProviderError> {
        Ok(self.latest_day(symbol).await?.into_profile(symbol))
    }

    async fn get_candles(
        &self,
        symbol: &str,
        resolution: Resolution,
        from: i64,
        to: i64,
    ) -> Result<CandleResponse, ProviderError> {
        let response = self
            .chart(
                symbol,
                &[
                    ("period1", from.to_string()),
                    ("period2", to.to_string()),
                    ("interval", resolution.yahoo_interval().to_string()),
                ],
            )
            .await?;

        match response.into_result(symbol) {
            Ok(result) => Ok(result.into_candles()),
            Err(ProviderError::NoData(reason)) => {
                debug!("{}", reason);
                Ok(CandleResponse::NoData)
            }
            Err(e) => Err(e),
        }
    }
}
