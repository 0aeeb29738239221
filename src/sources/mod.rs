//! Market data providers.
//!
//! Both backends expose the same three calls (quote, company profile and
//! daily candles) behind [`MarketDataProvider`], so the pipeline never
//! knows which vendor it is talking to.

pub mod finnhub;
pub mod yahoo;

pub use finnhub::FinnhubClient;
pub use yahoo::YahooFinanceClient;

use async_trait::async_trait;
use tracing::warn;

use crate::error::ProviderError;
use crate::types::{CandleResponse, CompanyProfile, Quote, Resolution};

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &'static str;

    async fn get_quote(&self, symbol: &str) -> Result<Quote, ProviderError>;

    async fn get_company_profile(&self, symbol: &str) -> Result<CompanyProfile, ProviderError>;

    /// Candles for `[from, to]`, both in Unix seconds.
    async fn get_candles(
        &self,
        symbol: &str,
        resolution: Resolution,
        from: i64,
        to: i64,
    ) -> Result<CandleResponse, ProviderError>;

    /// Profile lookup that never fails: name falls back to the symbol and
    /// market cap to zero.
    async fn company_profile_or_default(&self, symbol: &str) -> CompanyProfile {
        match self.get_company_profile(symbol).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("[{}] Profile unavailable for {}: {}", self.name(), symbol, e);
                CompanyProfile::fallback(symbol)
            }
        }
    }
}
