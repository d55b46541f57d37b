// =============================================================================
// REST API Endpoints - Axum 0.7
// =============================================================================
//
//   GET /api/v1/health                  liveness + throttle counters
//   GET /data?symbol=AAPL               single-symbol indicator frame
//   GET /compare-data?symbols=A,B,C     base-100 comparison
//
// Per-symbol failures are answered with 200 and an `{ "error": ... }` body;
// the presentation layer renders them inline.
//
// CORS is fully permissive; the browser front-end may be served from any
// origin.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::app_state::AppState;
use crate::provider::throttle::ThrottleSnapshot;
use crate::service::parse_symbol_list;
use crate::types::{AnalysisError, ErrorBody};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/data", get(data))
        .route("/compare-data", get(compare_data))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
    throttle: ThrottleSnapshot,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
        throttle: state.throttle_snapshot(),
    })
}

// =============================================================================
// Single-symbol indicators
// =============================================================================

#[derive(Deserialize)]
struct DataQuery {
    #[serde(default)]
    symbol: Option<String>,
}

async fn data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DataQuery>,
) -> impl IntoResponse {
    let symbol = query
        .symbol
        .unwrap_or_else(|| state.config.default_symbol.clone())
        .trim()
        .to_uppercase();
    info!(symbol = %symbol, "indicator request");

    Json(state.service.indicators(&symbol).await)
}

// =============================================================================
// Comparison
// =============================================================================

#[derive(Deserialize)]
struct CompareQuery {
    #[serde(default)]
    symbols: String,
}

async fn compare_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CompareQuery>,
) -> impl IntoResponse {
    let symbols = parse_symbol_list(&query.symbols);
    if symbols.is_empty() {
        return Json(ErrorBody::from(AnalysisError::NoSymbols)).into_response();
    }
    info!(symbols = ?symbols, "comparison request");

    Json(state.service.comparison(&symbols).await).into_response()
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::service::tests::FakeProvider;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(provider: FakeProvider) -> Router {
        let config = AppConfig {
            inter_request_delay_ms: 0,
            ..AppConfig::default()
        };
        router(Arc::new(AppState::new(config, Arc::new(provider))))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = get_json(app(FakeProvider::with(&[])), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["throttle"]["waits"], 0);
        assert_eq!(body["throttle"]["acquired"], 0);
    }

    #[tokio::test]
    async fn data_uppercases_symbol() {
        let (status, body) =
            get_json(app(FakeProvider::with(&[("MSFT", 150)])), "/data?symbol=msft").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbol"], "MSFT");
        assert_eq!(body["dates"].as_array().unwrap().len(), 150 - 89);
        assert!(body["last_close"].is_number());
    }

    #[tokio::test]
    async fn data_defaults_to_configured_symbol() {
        let (_, body) = get_json(app(FakeProvider::with(&[("AAPL", 120)])), "/data").await;
        assert_eq!(body["symbol"], "AAPL");
    }

    #[tokio::test]
    async fn data_unknown_symbol_is_error_body() {
        let (status, body) = get_json(app(FakeProvider::with(&[])), "/data?symbol=zzzz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], "Invalid symbol or no data found for ZZZZ.");
    }

    #[tokio::test]
    async fn data_with_short_history_has_empty_sequences() {
        let (_, body) = get_json(app(FakeProvider::with(&[("NEW", 40)])), "/data?symbol=NEW").await;
        assert_eq!(body["closes"].as_array().unwrap().len(), 0);
        assert!(body["high"].is_null());
        assert!(body["last_close"].is_null());
    }

    #[tokio::test]
    async fn compare_without_symbols_is_error_body() {
        let (status, body) = get_json(app(FakeProvider::with(&[])), "/compare-data?symbols=,%20,").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], "No valid symbols provided.");

        let (_, body) = get_json(app(FakeProvider::with(&[])), "/compare-data").await;
        assert_eq!(body["error"], "No valid symbols provided.");
    }

    #[tokio::test]
    async fn compare_mixes_frames_and_errors() {
        let provider = FakeProvider::with(&[("AAA", 200), ("BBB", 200)]);
        let (_, body) = get_json(app(provider), "/compare-data?symbols=aaa,nope,bbb").await;

        assert_eq!(body["AAA"]["close"][0], 100.0);
        assert_eq!(body["BBB"]["close"][0], 100.0);
        assert_eq!(body["NOPE"]["error"], "No data found for NOPE");
        assert_eq!(body.as_object().unwrap().len(), 3);
    }
}
