use super::AppState;
use super::models::{ApiError, LimitQuery, OrderBookData, OrderBookRequest, SuccessResponse};
use crate::config::MAX_DEPTH_LIMIT;
use crate::orderbook;
use crate::symbol::resolve_symbol;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Json;

type OrderBookResponse = Result<Json<SuccessResponse<OrderBookData>>, ApiError>;

/// GET /health, liveness check
pub async fn health() -> &'static str {
    "OK"
}

/// GET /api/orderbook/{symbol}?limit=N
pub async fn get_orderbook(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> OrderBookResponse {
    let Path(symbol) = path.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    fetch_orderbook(&state, &symbol, query.limit).await
}

/// POST /api/orderbook with `{ "symbol": "btc", "limit": 50 }`
pub async fn post_orderbook(
    State(state): State<AppState>,
    body: Result<Json<OrderBookRequest>, JsonRejection>,
) -> OrderBookResponse {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let symbol = request.symbol.unwrap_or_default();
    fetch_orderbook(&state, &symbol, request.limit).await
}

/// Resolves the symbol, pulls a raw snapshot from the injected depth source
/// and normalizes it. Client input is validated before any upstream call.
async fn fetch_orderbook(
    state: &AppState,
    raw_symbol: &str,
    limit: Option<u32>,
) -> OrderBookResponse {
    let symbol = resolve_symbol(raw_symbol, &state.config.quote_asset)?;
    let limit = validate_limit(limit, state.config.default_depth_limit)?;

    let raw = state.source.fetch_depth(&symbol, limit).await?;
    let snapshot = orderbook::normalize(&raw.bids, &raw.asks, &symbol)?;

    tracing::info!(
        "[{}] {}: bid={} ask={} spread={} ({:.6}%) levels={}/{} at {}",
        state.source.name(),
        snapshot.symbol(),
        snapshot.best_bid(),
        snapshot.best_ask(),
        snapshot.spread(),
        snapshot.spread_percent(),
        snapshot.bids().len(),
        snapshot.asks().len(),
        snapshot.timestamp()
    );
    metrics::counter!("depth_proxy_snapshots_total", "source" => state.source.name())
        .increment(1);

    Ok(Json(SuccessResponse::new(OrderBookData {
        snapshot,
        last_update_id: raw.last_update_id,
    })))
}

fn validate_limit(limit: Option<u32>, default: u16) -> Result<u16, ApiError> {
    match limit {
        None => Ok(default),
        Some(l) if (1..=u32::from(MAX_DEPTH_LIMIT)).contains(&l) => Ok(l as u16),
        Some(l) => Err(ApiError::InvalidLimit(l)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::config::Config;
    use crate::errors::ExchangeError;
    use crate::exchanges::DepthSource;
    use crate::models::RawDepth;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    enum Reply {
        Depth(RawDepth),
        Timeout,
        Rejected(u16, &'static str),
    }

    /// Records every call and answers with a canned reply.
    struct StubSource {
        reply: Reply,
        calls: Mutex<Vec<(String, u16)>>,
    }

    impl StubSource {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, u16)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DepthSource for StubSource {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn fetch_depth(&self, symbol: &str, limit: u16) -> Result<RawDepth, ExchangeError> {
            self.calls.lock().unwrap().push((symbol.to_string(), limit));
            match &self.reply {
                Reply::Depth(depth) => Ok(depth.clone()),
                Reply::Timeout => Err(ExchangeError::Timeout(5000)),
                Reply::Rejected(status, msg) => Err(ExchangeError::Rejected {
                    status: *status,
                    message: msg.to_string(),
                }),
            }
        }
    }

    fn raw(bids: &[(&str, &str)], asks: &[(&str, &str)]) -> RawDepth {
        let side = |levels: &[(&str, &str)]| {
            levels
                .iter()
                .map(|(p, q)| [p.to_string(), q.to_string()])
                .collect()
        };
        RawDepth {
            last_update_id: 777,
            bids: side(bids),
            asks: side(asks),
        }
    }

    fn sample_depth() -> RawDepth {
        raw(
            &[("100.0", "2"), ("99.5", "1")],
            &[("100.5", "3"), ("101.0", "1")],
        )
    }

    async fn send(source: Arc<StubSource>, request: Request<Body>) -> (StatusCode, Value) {
        let state = AppState::new(Config::default(), source);
        let response = router::build(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post(body: &str) -> Request<Body> {
        Request::post("/api/orderbook")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn get_returns_normalized_book() {
        let source = StubSource::new(Reply::Depth(sample_depth()));

        let (status, body) = send(source.clone(), get("/api/orderbook/btc?limit=50")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(source.calls(), vec![("BTCUSDT".to_string(), 50)]);
        assert_eq!(body["success"], true);

        let data = &body["data"];
        assert_eq!(data["symbol"], "BTCUSDT");
        assert_eq!(data["lastUpdateId"], 777);
        assert_eq!(data["bestBid"], 100.0);
        assert_eq!(data["bestAsk"], 100.5);
        assert!((data["spreadPercent"].as_f64().unwrap() - 0.5).abs() < 1e-9);
        assert!(data["timestamp"].as_u64().unwrap() > 0);
        assert_eq!(data["bids"][1]["cumulative"], 299.5);
        assert_eq!(data["asks"][0]["total"], 301.5);
        assert_eq!(data["asks"][1]["cumulative"], 402.5);
    }

    #[tokio::test]
    async fn post_uses_default_limit() {
        let source = StubSource::new(Reply::Depth(sample_depth()));

        let (status, body) = send(source.clone(), post(r#"{"symbol":"ethusdt"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["symbol"], "ETHUSDT");
        assert_eq!(source.calls(), vec![("ETHUSDT".to_string(), 20)]);
    }

    #[tokio::test]
    async fn post_without_symbol_is_client_error() {
        let source = StubSource::new(Reply::Depth(sample_depth()));

        let (status, body) = send(source.clone(), post(r#"{"limit":10}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Symbol is required");
        assert!(body.get("details").is_none());
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn unparseable_body_is_client_error() {
        let source = StubSource::new(Reply::Depth(sample_depth()));

        let (status, body) = send(source, post("{not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request");
    }

    #[tokio::test]
    async fn invalid_symbol_and_limit_never_reach_upstream() {
        let source = StubSource::new(Reply::Depth(sample_depth()));

        let (status, body) = send(source.clone(), get("/api/orderbook/btc-usd")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid symbol");
        assert_eq!(body["details"], "btc-usd");

        let (status, body) = send(source.clone(), get("/api/orderbook/btc?limit=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid limit");

        let (status, _) = send(source.clone(), get("/api/orderbook/btc?limit=9999")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(source.clone(), get("/api/orderbook/btc?limit=abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn undecodable_path_gets_json_envelope() {
        let source = StubSource::new(Reply::Depth(sample_depth()));

        let (status, body) = send(source.clone(), get("/api/orderbook/%FF")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid request");
        assert!(body["details"].as_str().unwrap().contains("UTF-8"));
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn overflowing_level_is_server_error_not_null() {
        let source = StubSource::new(Reply::Depth(raw(&[("1e200", "1e200")], &[])));

        let (status, body) = send(source, get("/api/orderbook/btc")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["details"], "bids[0] total overflows f64");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn upstream_timeout_is_gateway_timeout() {
        let source = StubSource::new(Reply::Timeout);

        let (status, body) = send(source, get("/api/orderbook/btc")).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Upstream request timed out");
    }

    #[tokio::test]
    async fn unknown_symbol_upstream_is_client_error() {
        let source = StubSource::new(Reply::Rejected(400, "Invalid symbol."));

        let (status, body) = send(source, get("/api/orderbook/nope")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"], "Invalid symbol.");
    }

    #[tokio::test]
    async fn malformed_level_is_server_error() {
        let source = StubSource::new(Reply::Depth(raw(&[("abc", "1")], &[("101", "1")])));

        let (status, body) = send(source, get("/api/orderbook/btc")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Malformed order book data");
        assert_eq!(body["details"], "malformed price \"abc\" at bids[0]");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn empty_book_is_success() {
        let source = StubSource::new(Reply::Depth(raw(&[], &[])));

        let (status, body) = send(source, get("/api/orderbook/btc")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["bestBid"], 0.0);
        assert_eq!(body["data"]["spread"], 0.0);
        assert_eq!(body["data"]["bids"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn health_is_ok() {
        let state = AppState::new(
            Config::default(),
            StubSource::new(Reply::Depth(sample_depth())),
        );
        let response = router::build(state).oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }
}
