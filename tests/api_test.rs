//! HTTP surface tests. Requests go through the full router with a stub
//! provider and an in-memory store.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use swing_scanner::api;
use swing_scanner::config::Config;
use swing_scanner::error::ProviderError;
use swing_scanner::services::{BatchExecutor, SqliteStore, WatchlistService};
use swing_scanner::sources::MarketDataProvider;
use swing_scanner::types::{CandlePayload, CandleResponse, CompanyProfile, Quote, Resolution};
use swing_scanner::AppState;

const START: i64 = 1_704_067_200;

/// Quotes every symbol at a fixed price with a steadily rising history.
/// Symbols starting with "X" are unknown to the provider.
struct StubProvider;

#[async_trait]
impl MarketDataProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, ProviderError> {
        if symbol.starts_with('X') {
            return Err(ProviderError::NoData(format!("No data available for {}", symbol)));
        }
        Ok(Quote {
            current_price: 200.0,
            open: Some(198.0),
            high: Some(201.0),
            low: Some(197.5),
            previous_close: Some(199.0),
            volume: Some(1_000_000.0),
        })
    }

    async fn get_company_profile(&self, symbol: &str) -> Result<CompanyProfile, ProviderError> {
        Ok(CompanyProfile {
            name: format!("{} Ltd", symbol),
            market_cap: 1.0e10,
        })
    }

    async fn get_candles(
        &self,
        _symbol: &str,
        _resolution: Resolution,
        _from: i64,
        _to: i64,
    ) -> Result<CandleResponse, ProviderError> {
        let closes: Vec<Option<f64>> = (0..60).map(|i| Some(120.0 + i as f64)).collect();
        Ok(CandleResponse::Ok(CandlePayload {
            timestamps: Some((0..60).map(|i| START + i * 86_400).collect()),
            open: Some(closes.clone()),
            high: Some(closes.clone()),
            low: Some(closes.clone()),
            close: Some(closes),
            volume: Some(vec![Some(5000.0); 60]),
        }))
    }
}

fn test_app() -> Router {
    let config = Arc::new(Config::default());
    let store = Arc::new(SqliteStore::new_in_memory().unwrap());
    let executor =
        Arc::new(BatchExecutor::new(Arc::new(StubProvider), store.clone()).with_rate(6000));
    let watchlists = Arc::new(WatchlistService::new(
        store.clone(),
        store.clone(),
        executor.clone(),
    ));

    api::app(AppState {
        config,
        executor,
        signals: store,
        watchlists,
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["provider"], Config::default().provider.to_string());
    assert_eq!(body["callsPerMinute"], 6000);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_multiple_then_list() {
    let app = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/stocks/fetch-multiple",
        Some(json!({"symbols": ["tcs.ns", "XFAIL.NS", "INFY.NS"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Fetched 2 out of 3 stocks");
    assert_eq!(body["data"]["succeeded"], json!(["TCS.NS", "INFY.NS"]));
    assert_eq!(body["data"]["failed"][0]["symbol"], "XFAIL.NS");
    assert_eq!(body["data"]["failed"][0]["stage"], "fetching");

    let (status, body) = send(&app, "GET", "/api/stocks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    // Newest first
    assert_eq!(body["data"][0]["symbol"], "INFY.NS");
    assert_eq!(body["data"][0]["trend"], "Uptrend");
    assert_eq!(body["data"][0]["currentPrice"], 200.0);
    assert_eq!(body["data"][0]["companyName"], "INFY.NS Ltd");
}

#[tokio::test]
async fn test_fetch_multiple_rejects_empty_list() {
    let app = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/stocks/fetch-multiple",
        Some(json!({"symbols": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Please provide an array of stock symbols");

    let (status, _) = send(
        &app,
        "POST",
        "/api/stocks/fetch-multiple",
        Some(json!({"symbols": "TCS"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(start_paused = true)]
async fn test_list_filters() {
    let app = test_app();
    send(
        &app,
        "POST",
        "/api/stocks/fetch-multiple",
        Some(json!({"symbols": ["TCS.NS"]})),
    )
    .await;

    let (_, body) = send(&app, "GET", "/api/stocks?trend=Downtrend", None).await;
    assert_eq!(body["count"], 0);

    let (_, body) = send(
        &app,
        "GET",
        "/api/stocks?trend=Uptrend&minPrice=150&maxPrice=250",
        None,
    )
    .await;
    assert_eq!(body["count"], 1);

    let (_, body) = send(&app, "GET", "/api/stocks?minRiskReward=3", None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_invalid_filter_uses_error_envelope() {
    let app = test_app();

    for uri in ["/api/stocks?trend=sideways", "/api/stocks?minPrice=abc"] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["success"], false);
        assert_eq!(body["status"], 400);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_refetch_single_symbol() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/api/stocks/refetch/wipro.ns", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Stock WIPRO.NS refetched successfully");
    assert_eq!(body["data"]["symbol"], "WIPRO.NS");
    assert_eq!(body["data"]["riskToReward"], 2.0);

    let (status, body) = send(&app, "GET", "/api/stocks/refetch/XYZ", None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_delete_stock() {
    let app = test_app();
    send(&app, "GET", "/api/stocks/refetch/TCS.NS", None).await;

    let (status, body) = send(&app, "DELETE", "/api/stocks/tcs.ns", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Stock TCS.NS deleted successfully");

    let (_, body) = send(&app, "GET", "/api/stocks", None).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test(start_paused = true)]
async fn test_watchlist_lifecycle() {
    let app = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/watchlists",
        Some(json!({
            "name": "IT",
            "description": "Large cap IT",
            "stockSymbols": ["tcs.ns", "infy.ns"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "IT");
    assert_eq!(body["data"]["stockSymbols"], json!(["TCS.NS", "INFY.NS"]));
    assert_eq!(body["data"]["memberSignals"], json!([]));
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", &format!("/api/watchlists/{}/refetch", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Refetched 2 out of 2 stocks");

    let (status, body) = send(&app, "GET", &format!("/api/watchlists/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["memberSignals"].as_array().unwrap().len(), 2);
    assert!(body["data"]["lastRefetched"].is_string());

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/watchlists/{}", id),
        Some(json!({"name": "Tech"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Tech");
    assert_eq!(body["data"]["description"], "Large cap IT");

    let (_, body) = send(&app, "GET", "/api/watchlists", None).await;
    assert_eq!(body["count"], 1);

    let (status, body) = send(&app, "DELETE", &format!("/api/watchlists/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Watchlist deleted successfully");

    let (status, _) = send(&app, "GET", &format!("/api/watchlists/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_watchlist_errors() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/api/watchlists/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Watchlist not found");

    let (status, body) = send(&app, "POST", "/api/watchlists", Some(json!({"name": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Watchlist name is required");
}
