//! HTTP client tests against local axum stub servers

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use candle_sync::prelude::*;
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Serve `app` on an ephemeral port and return its base URL
async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[derive(Default)]
struct Seen {
    paths: Vec<String>,
    queries: Vec<HashMap<String, String>>,
    headers: Vec<HeaderMap>,
    bodies: Vec<String>,
}

type Shared = Arc<Mutex<Seen>>;

#[tokio::test]
async fn test_client_decodes_candle_page() {
    let seen: Shared = Arc::default();
    let app = Router::new()
        .route(
            "/candles/:path/hist",
            get(
                |State(seen): State<Shared>,
                 Path(path): Path<String>,
                 Query(query): Query<HashMap<String, String>>| async move {
                    let mut seen = seen.lock().unwrap();
                    seen.paths.push(path);
                    seen.queries.push(query);
                    Json(json!([
                        [1613908800000i64, 1.5, 2, 3, 0.5, 10],
                        [1613908860000i64, 2, 2.5, 2.75, 1.75, 4.25]
                    ]))
                },
            ),
        )
        .with_state(seen.clone());
    let client = BitfinexClient::new(&spawn(app).await).unwrap();
    let key = SeriesKey::new("tBTCUSD", Timeframe::OneHour);

    let response = client.fetch_page(&key, 1_613_908_800_000).await.unwrap();

    let RawResponse::Page(candles) = response else {
        panic!("expected a page");
    };
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0], Candle::new(1_613_908_800_000, 1.5, 2.0, 3.0, 0.5, 10.0));
    assert_eq!(candles[1].close, 2.5);
    assert_eq!(candles[1].high, 2.75);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.paths, vec!["trade:1h:tBTCUSD".to_string()]);
    assert_eq!(seen.queries[0]["limit"], "1000");
    assert_eq!(seen.queries[0]["start"], "1613908800000");
    assert_eq!(seen.queries[0]["sort"], "1");
}

#[tokio::test]
async fn test_client_reads_error_payload_despite_status() {
    let app = Router::new().route(
        "/candles/:path/hist",
        get(|| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!(["error", 11010, "ratelimit: error"])),
            )
        }),
    );
    let client = BitfinexClient::new(&spawn(app).await).unwrap();
    let key = SeriesKey::new("tBTCUSD", Timeframe::OneMinute);

    let response = client.fetch_page(&key, 0).await.unwrap();

    let RawResponse::Signal(signal) = response else {
        panic!("expected a signal");
    };
    assert_eq!(signal.code, ERROR_CODE_RATE_LIMIT);
    assert_eq!(signal.kind(), SignalKind::RateLimited);
}

#[tokio::test]
async fn test_client_rejects_non_json_body() {
    let app = Router::new().route(
        "/candles/:path/hist",
        get(|| async { (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>") }),
    );
    let client = BitfinexClient::new(&spawn(app).await).unwrap();
    let key = SeriesKey::new("tBTCUSD", Timeframe::OneMinute);

    let err = client.fetch_page(&key, 0).await.unwrap_err();

    assert!(matches!(err, ExchangeError::Decode { status: 502, .. }));
}

fn influx_app(seen: Shared, query_status: StatusCode, query_body: &'static str) -> Router {
    Router::new()
        .route(
            "/api/v2/write",
            post(
                |State(seen): State<Shared>,
                 Query(query): Query<HashMap<String, String>>,
                 headers: HeaderMap,
                 body: String| async move {
                    let mut seen = seen.lock().unwrap();
                    seen.paths.push("write".to_string());
                    seen.queries.push(query);
                    seen.headers.push(headers);
                    seen.bodies.push(body);
                    StatusCode::NO_CONTENT
                },
            ),
        )
        .route(
            "/api/v2/query",
            post(
                move |State(seen): State<Shared>,
                      Query(query): Query<HashMap<String, String>>,
                      headers: HeaderMap,
                      body: String| async move {
                    let mut seen = seen.lock().unwrap();
                    seen.paths.push("query".to_string());
                    seen.queries.push(query);
                    seen.headers.push(headers);
                    seen.bodies.push(body);
                    (query_status, query_body)
                },
            ),
        )
        .with_state(seen)
}

fn store_config(url: &str) -> StoreConfig {
    StoreConfig::new(url, "secret-token", "acme", "candles")
}

#[tokio::test]
async fn test_store_writes_line_protocol() {
    let seen: Shared = Arc::default();
    let url = spawn(influx_app(seen.clone(), StatusCode::OK, "")).await;
    let store = InfluxStore::new(store_config(&url)).unwrap();
    let key = SeriesKey::new("tBTCUSD", Timeframe::OneHour);
    let points = encode(&key, &[Candle::new(1000, 1.5, 2.0, 3.0, 0.5, 10.0)]);

    store.write_points(&points).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.paths, vec!["write".to_string()]);
    assert_eq!(seen.queries[0]["org"], "acme");
    assert_eq!(seen.queries[0]["bucket"], "candles");
    assert_eq!(seen.queries[0]["precision"], "ns");
    assert_eq!(seen.headers[0]["authorization"], "Token secret-token");
    assert_eq!(
        seen.bodies[0],
        "tBTCUSD,timeframe=1h open=1.5,high=3,low=0.5,close=2,volume=10 1000000000"
    );
}

#[tokio::test]
async fn test_store_skips_empty_batch() {
    let seen: Shared = Arc::default();
    let url = spawn(influx_app(seen.clone(), StatusCode::OK, "")).await;
    let store = InfluxStore::new(store_config(&url)).unwrap();

    store.write_points(&[]).await.unwrap();

    assert!(seen.lock().unwrap().paths.is_empty());
}

const LAST_SAMPLE_CSV: &str = "#datatype,string,long,dateTime:RFC3339,dateTime:RFC3339,dateTime:RFC3339,double,string,string,string\r\n\
#group,false,false,true,true,false,false,true,true,true\r\n\
#default,last,,,,,,,,\r\n\
,result,table,_start,_stop,_time,_value,_field,_measurement,timeframe\r\n\
,,0,1999-05-04T00:00:00Z,2026-10-18T00:00:00Z,2021-02-21T12:00:00Z,1.5,open,tBTCUSD,1h\r\n\
\r\n";

#[tokio::test]
async fn test_store_reads_latest_timestamp() {
    let seen: Shared = Arc::default();
    let url = spawn(influx_app(seen.clone(), StatusCode::OK, LAST_SAMPLE_CSV)).await;
    let store = InfluxStore::new(store_config(&url)).unwrap();
    let key = SeriesKey::new("tBTCUSD", Timeframe::OneHour);

    let latest = store.latest_timestamp(&key).await.unwrap();

    assert_eq!(latest, Some(Utc.with_ymd_and_hms(2021, 2, 21, 12, 0, 0).unwrap()));
    let seen = seen.lock().unwrap();
    assert_eq!(seen.paths, vec!["query".to_string()]);
    assert_eq!(seen.queries[0]["org"], "acme");
    assert_eq!(seen.headers[0]["content-type"], "application/vnd.flux");
    assert_eq!(seen.headers[0]["accept"], "application/csv");
    assert!(seen.bodies[0].contains("from(bucket: \"candles\")"));
    assert!(seen.bodies[0].contains("r[\"_measurement\"] == \"tBTCUSD\""));
    assert!(seen.bodies[0].contains("r[\"timeframe\"] == \"1h\""));
}

#[tokio::test]
async fn test_store_empty_result_is_none() {
    let url = spawn(influx_app(Arc::default(), StatusCode::OK, "\r\n")).await;
    let store = InfluxStore::new(store_config(&url)).unwrap();
    let key = SeriesKey::new("tNEWUSD", Timeframe::OneMinute);

    assert_eq!(store.latest_timestamp(&key).await.unwrap(), None);
}

#[tokio::test]
async fn test_store_surfaces_rejection() {
    let url = spawn(influx_app(
        Arc::default(),
        StatusCode::UNAUTHORIZED,
        "{\"code\":\"unauthorized\",\"message\":\"unauthorized access\"}",
    ))
    .await;
    let store = InfluxStore::new(store_config(&url)).unwrap();
    let key = SeriesKey::new("tBTCUSD", Timeframe::OneMinute);

    let err = store.latest_timestamp(&key).await.unwrap_err();

    match err {
        StoreError::Rejected { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("unauthorized access"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_sync_over_http_catches_up() {
    let exchange = Router::new().route(
        "/candles/:path/hist",
        get(|Query(query): Query<HashMap<String, String>>| async move {
            let start: i64 = query["start"].parse().unwrap();
            if start < 1_613_908_800_000 {
                Json(json!([[start, 1, 1, 1, 1, 1], [1613908800000i64, 1, 1, 1, 1, 1]]))
            } else {
                Json(json!([[1613908800000i64, 1, 1, 1, 1, 1]]))
            }
        }),
    );
    let seen: Shared = Arc::default();
    let influx = spawn(influx_app(seen.clone(), StatusCode::OK, "")).await;

    let exchange_url = spawn(exchange).await;
    let config = SyncConfig {
        request_delay: Duration::ZERO,
        retry: RetryPolicy::immediate(3),
        ..SyncConfig::default()
    };
    let client = BitfinexClient::new(&exchange_url).unwrap();
    let store = InfluxStore::new(store_config(&influx)).unwrap();
    let engine = SyncEngine::new(client, store, config).unwrap();

    let summary = engine
        .run(&StaticSymbols::from_lists("tBTCUSD", "1D"))
        .await
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.synced[0].fetches, 2);
    assert_eq!(summary.synced[0].writes, 1);
    assert_eq!(summary.total_points(), 2);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.paths, vec!["query".to_string(), "write".to_string()]);
}
