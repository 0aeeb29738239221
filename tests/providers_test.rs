//! Provider clients against a local mock server.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use swing_scanner::error::ProviderError;
use swing_scanner::services::normalize;
use swing_scanner::sources::{FinnhubClient, MarketDataProvider, YahooFinanceClient};
use swing_scanner::types::{CandleResponse, Resolution};

fn finnhub(server: &MockServer) -> FinnhubClient {
    FinnhubClient::with_base_url("test-key".to_string(), &server.uri())
}

fn yahoo(server: &MockServer) -> YahooFinanceClient {
    YahooFinanceClient::with_base_url(&format!("{}/v8/finance/chart", server.uri()))
}

// ============ Finnhub ============

#[tokio::test]
async fn test_finnhub_quote() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quote"))
        .and(query_param("symbol", "AAPL"))
        .and(query_param("token", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "c": 189.5, "d": 1.2, "dp": 0.64, "h": 190.1, "l": 187.0,
            "o": 188.0, "pc": 188.3, "t": 1_700_000_000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let quote = finnhub(&server).get_quote("AAPL").await.unwrap();
    assert_eq!(quote.current_price, 189.5);
    assert_eq!(quote.high, Some(190.1));
    assert_eq!(quote.previous_close, Some(188.3));
    assert_eq!(quote.volume, None);
}

#[tokio::test]
async fn test_finnhub_zero_quote_is_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "c": 0, "d": null, "dp": null, "h": 0, "l": 0, "o": 0, "pc": 0, "t": 0
        })))
        .mount(&server)
        .await;

    let err = finnhub(&server).get_quote("NOPE").await.unwrap_err();
    assert_eq!(err, ProviderError::NoData("No data available for NOPE".into()));
}

#[tokio::test]
async fn test_finnhub_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/quote"))
        .respond_with(ResponseTemplate::new(429).set_body_string("API limit reached"))
        .mount(&server)
        .await;

    let err = finnhub(&server).get_quote("AAPL").await.unwrap_err();
    assert_eq!(err, ProviderError::Status(429));
}

#[tokio::test]
async fn test_finnhub_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stock/profile2"))
        .and(query_param("symbol", "AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "country": "US",
            "name": "Apple Inc",
            "marketCapitalization": 2_950_000.5,
            "ticker": "AAPL"
        })))
        .mount(&server)
        .await;

    let provider = finnhub(&server);
    let profile = provider.get_company_profile("AAPL").await.unwrap();
    assert_eq!(profile.name, "Apple Inc");
    assert_eq!(profile.market_cap, 2_950_000.5 * 1_000_000.0);
}

#[tokio::test]
async fn test_finnhub_profile_failure_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stock/profile2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let profile = finnhub(&server).company_profile_or_default("ZZZ").await;
    assert_eq!(profile.name, "ZZZ");
    assert_eq!(profile.market_cap, 0.0);
}

#[tokio::test]
async fn test_finnhub_candles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stock/candle"))
        .and(query_param("symbol", "AAPL"))
        .and(query_param("resolution", "D"))
        .and(query_param("from", "1700000000"))
        .and(query_param("to", "1700259200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "s": "ok",
            "t": [1_700_172_800, 1_700_000_000, 1_700_086_400],
            "o": [3.0, 1.0, 2.0],
            "h": [3.5, 1.5, 2.5],
            "l": [2.5, 0.5, 1.5],
            "c": [3.2, 1.2, 2.2],
            "v": [300, 100, 200]
        })))
        .mount(&server)
        .await;

    let response = finnhub(&server)
        .get_candles("AAPL", Resolution::Daily, 1_700_000_000, 1_700_259_200)
        .await
        .unwrap();

    let CandleResponse::Ok(payload) = response else {
        panic!("expected candles");
    };
    let points = normalize(&payload).unwrap();
    let closes: Vec<f64> = points.iter().map(|p| p.close).collect();
    assert_eq!(closes, vec![1.2, 2.2, 3.2]);
}

#[tokio::test]
async fn test_finnhub_candles_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stock/candle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"s": "no_data"})))
        .mount(&server)
        .await;

    let response = finnhub(&server)
        .get_candles("NEWIPO", Resolution::Daily, 0, 1)
        .await
        .unwrap();
    assert_eq!(response, CandleResponse::NoData);
}

// ============ Yahoo Finance ============

fn chart_body() -> serde_json::Value {
    json!({
        "chart": {
            "result": [{
                "meta": {
                    "currency": "INR",
                    "symbol": "TCS.NS",
                    "regularMarketPrice": 3850.4,
                    "regularMarketDayHigh": 3871.0,
                    "regularMarketDayLow": 3822.15,
                    "regularMarketVolume": 1_523_000,
                    "chartPreviousClose": 3830.0,
                    "longName": "Tata Consultancy Services Limited",
                    "shortName": "TCS"
                },
                "timestamp": [1_700_000_000, 1_700_086_400, 1_700_172_800],
                "indicators": {
                    "quote": [{
                        "open": [3800.0, null, 3840.0],
                        "high": [3820.0, null, 3871.0],
                        "low": [3790.0, null, 3822.15],
                        "close": [3810.0, null, 3850.4],
                        "volume": [1_200_000, null, 1_523_000]
                    }]
                }
            }],
            "error": null
        }
    })
}

#[tokio::test]
async fn test_yahoo_quote_and_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/TCS.NS"))
        .and(query_param("interval", "1d"))
        .and(query_param("range", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .expect(2)
        .mount(&server)
        .await;

    let provider = yahoo(&server);
    let quote = provider.get_quote("TCS.NS").await.unwrap();
    assert_eq!(quote.current_price, 3850.4);
    assert_eq!(quote.high, Some(3871.0));
    assert_eq!(quote.previous_close, Some(3830.0));
    assert_eq!(quote.volume, Some(1_523_000.0));
    assert_eq!(quote.open, Some(3800.0));

    let profile = provider.get_company_profile("TCS.NS").await.unwrap();
    assert_eq!(profile.name, "Tata Consultancy Services Limited");
    assert_eq!(profile.market_cap, 0.0);
}

#[tokio::test]
async fn test_yahoo_candles_skip_null_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/TCS.NS"))
        .and(query_param("period1", "1700000000"))
        .and(query_param("period2", "1700259200"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .mount(&server)
        .await;

    let response = yahoo(&server)
        .get_candles("TCS.NS", Resolution::Daily, 1_700_000_000, 1_700_259_200)
        .await
        .unwrap();

    let CandleResponse::Ok(payload) = response else {
        panic!("expected candles");
    };
    let points = normalize(&payload).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[1].close, 3850.4);
}

#[tokio::test]
async fn test_yahoo_unknown_symbol() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/FAKE.NS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        })))
        .mount(&server)
        .await;

    let provider = yahoo(&server);
    let err = provider.get_quote("FAKE.NS").await.unwrap_err();
    assert!(matches!(err, ProviderError::NoData(_)));

    let candles = provider
        .get_candles("FAKE.NS", Resolution::Daily, 0, 1)
        .await
        .unwrap();
    assert_eq!(candles, CandleResponse::NoData);
}

#[tokio::test]
async fn test_yahoo_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/TCS.NS"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = yahoo(&server).get_quote("TCS.NS").await.unwrap_err();
    assert_eq!(err, ProviderError::Status(503));
}
