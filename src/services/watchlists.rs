//! Watchlist service: named symbol groups and their refetch.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::services::batch::BatchExecutor;
use crate::services::sqlite_store::{SignalRepository, WatchlistRepository};
use crate::types::{
    normalize_symbols, BatchResult, CreateWatchlist, UpdateWatchlist, Watchlist, WatchlistView,
};

pub struct WatchlistService {
    watchlists: Arc<dyn WatchlistRepository>,
    signals: Arc<dyn SignalRepository>,
    executor: Arc<BatchExecutor>,
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Watchlist name is required".to_string()));
    }
    Ok(name.to_string())
}

impl WatchlistService {
    pub fn new(
        watchlists: Arc<dyn WatchlistRepository>,
        signals: Arc<dyn SignalRepository>,
        executor: Arc<BatchExecutor>,
    ) -> Self {
        Self {
            watchlists,
            signals,
            executor,
        }
    }

    /// Resolve member signals at read time.
    fn view(&self, watchlist: Watchlist) -> Result<WatchlistView> {
        let member_signals = self.signals.find_signals_by_symbols(&watchlist.stock_symbols)?;
        Ok(WatchlistView {
            watchlist,
            member_signals,
        })
    }

    fn find(&self, id: Uuid) -> Result<Watchlist> {
        self.watchlists
            .get_watchlist(id)?
            .ok_or_else(|| AppError::NotFound("Watchlist not found".to_string()))
    }

    pub fn create(&self, request: CreateWatchlist) -> Result<WatchlistView> {
        let name = validate_name(&request.name)?;
        let stock_symbols =
            normalize_symbols(&request.stock_symbols).map_err(AppError::BadRequest)?;
        let now = Utc::now();

        let watchlist = Watchlist {
            id: Uuid::new_v4(),
            name,
            description: request.description.unwrap_or_default(),
            stock_symbols,
            is_active: true,
            last_refetched: None,
            created_at: now,
            updated_at: now,
        };

        self.watchlists.insert_watchlist(&watchlist)?;
        info!("Created watchlist {} ({} symbols)", watchlist.name, watchlist.stock_symbols.len());
        self.view(watchlist)
    }

    pub fn list(&self) -> Result<Vec<WatchlistView>> {
        self.watchlists
            .list_watchlists()?
            .into_iter()
            .map(|w| self.view(w))
            .collect()
    }

    pub fn get(&self, id: Uuid) -> Result<WatchlistView> {
        let watchlist = self.find(id)?;
        self.view(watchlist)
    }

    /// Partial update; absent fields are left unchanged.
    pub fn update(&self, id: Uuid, request: UpdateWatchlist) -> Result<WatchlistView> {
        let mut watchlist = self.find(id)?;

        if let Some(name) = request.name {
            watchlist.name = validate_name(&name)?;
        }
        if let Some(description) = request.description {
            watchlist.description = description;
        }
        if let Some(symbols) = request.stock_symbols {
            watchlist.stock_symbols = normalize_symbols(&symbols).map_err(AppError::BadRequest)?;
        }
        watchlist.updated_at = Utc::now();

        if !self.watchlists.update_watchlist(&watchlist)? {
            return Err(AppError::NotFound("Watchlist not found".to_string()));
        }
        self.view(watchlist)
    }

    pub fn delete(&self, id: Uuid) -> Result<()> {
        if !self.watchlists.delete_watchlist(id)? {
            return Err(AppError::NotFound("Watchlist not found".to_string()));
        }
        info!("Deleted watchlist {}", id);
        Ok(())
    }

    /// Re-run the pipeline over every member symbol, then stamp
    /// `lastRefetched`.
    pub async fn refetch(&self, id: Uuid) -> Result<BatchResult> {
        let watchlist = self.find(id)?;

        info!(
            "Refetching watchlist {} ({} symbols)",
            watchlist.name,
            watchlist.stock_symbols.len()
        );
        let result = self.executor.run(&watchlist.stock_symbols).await;

        // Edits made while the batch ran are kept; only the stamp is written.
        if !self.watchlists.mark_refetched(id, Utc::now())? {
            warn!("Watchlist {} was deleted during refetch", id);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::services::sqlite_store::SqliteStore;
    use crate::sources::MarketDataProvider;
    use crate::types::{CandleResponse, CompanyProfile, Quote, Resolution};
    use async_trait::async_trait;

    struct FlatProvider;

    #[async_trait]
    impl MarketDataProvider for FlatProvider {
        fn name(&self) -> &'static str {
            "flat"
        }

        async fn get_quote(&self, symbol: &str) -> std::result::Result<Quote, ProviderError> {
            if symbol == "BAD" {
                return Err(ProviderError::Status(500));
            }
            Ok(Quote {
                current_price: 50.0,
                open: None,
                high: None,
                low: None,
                previous_close: None,
                volume: None,
            })
        }

        async fn get_company_profile(
            &self,
            symbol: &str,
        ) -> std::result::Result<CompanyProfile, ProviderError> {
            Ok(CompanyProfile::fallback(symbol))
        }

        async fn get_candles(
            &self,
            _symbol: &str,
            _resolution: Resolution,
            _from: i64,
            _to: i64,
        ) -> std::result::Result<CandleResponse, ProviderError> {
            Ok(CandleResponse::NoData)
        }
    }

    fn service() -> WatchlistService {
        let store = Arc::new(SqliteStore::new_in_memory().unwrap());
        let executor = Arc::new(BatchExecutor::new(Arc::new(FlatProvider), store.clone()));
        WatchlistService::new(store.clone(), store, executor)
    }

    fn create_request(name: &str, symbols: &[&str]) -> CreateWatchlist {
        CreateWatchlist {
            name: name.to_string(),
            description: None,
            stock_symbols: symbols.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_create_normalizes_symbols() {
        let service = service();
        let view = service
            .create(create_request("  Banks ", &["hdfcbank.ns", "ICICIBANK.NS", "HDFCBANK.NS"]))
            .unwrap();

        assert_eq!(view.watchlist.name, "Banks");
        assert_eq!(view.watchlist.stock_symbols, vec!["HDFCBANK.NS", "ICICIBANK.NS"]);
        assert!(view.watchlist.is_active);
        assert!(view.watchlist.last_refetched.is_none());
        assert!(view.member_signals.is_empty());
    }

    #[test]
    fn test_create_rejects_blank_name_and_symbols() {
        let service = service();
        assert!(matches!(
            service.create(create_request("   ", &["AAA"])),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            service.create(create_request("ok", &["AAA", ""])),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_update_is_partial() {
        let service = service();
        let created = service.create(create_request("Pharma", &["SUNPHARMA.NS"])).unwrap();
        let id = created.watchlist.id;

        let updated = service
            .update(
                id,
                UpdateWatchlist {
                    description: Some("large caps".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.watchlist.name, "Pharma");
        assert_eq!(updated.watchlist.description, "large caps");
        assert_eq!(updated.watchlist.stock_symbols, vec!["SUNPHARMA.NS"]);

        assert!(matches!(
            service.update(
                id,
                UpdateWatchlist {
                    name: Some("".into()),
                    ..Default::default()
                }
            ),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let service = service();
        let id = Uuid::new_v4();
        assert!(matches!(service.get(id), Err(AppError::NotFound(_))));
        assert!(matches!(service.delete(id), Err(AppError::NotFound(_))));
        assert!(matches!(
            service.update(id, UpdateWatchlist::default()),
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_resolves_members_and_stamps_time() {
        let service = service();
        let created = service.create(create_request("Mixed", &["AAA", "BAD", "CCC"])).unwrap();
        let id = created.watchlist.id;

        let result = service.refetch(id).await.unwrap();
        assert_eq!(result.succeeded, vec!["AAA", "CCC"]);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].symbol, "BAD");

        let view = service.get(id).unwrap();
        assert!(view.watchlist.last_refetched.is_some());
        let members: Vec<_> = view.member_signals.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(members, vec!["AAA", "CCC"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_empty_watchlist() {
        let service = service();
        let created = service.create(create_request("Empty", &[])).unwrap();
        let result = service.refetch(created.watchlist.id).await.unwrap();
        assert_eq!(result, BatchResult::default());
    }

    /// Takes five seconds per quote.
    struct SlowProvider;

    #[async_trait]
    impl MarketDataProvider for SlowProvider {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn get_quote(&self, symbol: &str) -> std::result::Result<Quote, ProviderError> {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            FlatProvider.get_quote(symbol).await
        }

        async fn get_company_profile(
            &self,
            symbol: &str,
        ) -> std::result::Result<CompanyProfile, ProviderError> {
            Ok(CompanyProfile::fallback(symbol))
        }

        async fn get_candles(
            &self,
            _symbol: &str,
            _resolution: Resolution,
            _from: i64,
            _to: i64,
        ) -> std::result::Result<CandleResponse, ProviderError> {
            Ok(CandleResponse::NoData)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_during_refetch_is_kept() {
        let store = Arc::new(SqliteStore::new_in_memory().unwrap());
        let executor = Arc::new(BatchExecutor::new(Arc::new(SlowProvider), store.clone()));
        let service = Arc::new(WatchlistService::new(store.clone(), store, executor));

        let id = service.create(create_request("Old", &["AAA", "BBB"])).unwrap().watchlist.id;

        let refetch = tokio::spawn({
            let service = service.clone();
            async move { service.refetch(id).await }
        });

        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        service
            .update(
                id,
                UpdateWatchlist {
                    name: Some("Renamed".into()),
                    stock_symbols: Some(vec!["CCC".into()]),
                    ..Default::default()
                },
            )
            .unwrap();

        let result = refetch.await.unwrap().unwrap();
        assert_eq!(result.succeeded, vec!["AAA", "BBB"]);

        let view = service.get(id).unwrap();
        assert_eq!(view.watchlist.name, "Renamed");
        assert_eq!(view.watchlist.stock_symbols, vec!["CCC"]);
        assert!(view.watchlist.last_refetched.is_some());
    }
}
