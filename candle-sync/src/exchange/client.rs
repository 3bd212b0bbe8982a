//! HTTP client for the public candle history endpoint

use crate::data::SeriesKey;
use crate::error::ExchangeError;
use crate::exchange::RawResponse;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE_URL: &str = "https://api-pub.bitfinex.com/v2";

/// Maximum number of candles the endpoint returns per request
pub const PAGE_LIMIT: usize = 1000;

/// Source of candle pages
///
/// Implementations issue exactly one request per call. Retry policy belongs
/// to the caller.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Fetch up to [`PAGE_LIMIT`] candles, oldest first, starting at `since_ms`
    async fn fetch_page(&self, key: &SeriesKey, since_ms: i64) -> Result<RawResponse, ExchangeError>;
}

/// Bitfinex public REST client
#[derive(Debug, Clone)]
pub struct BitfinexClient {
    base_url: String,
    client: Client,
}

impl BitfinexClient {
    pub fn new(base_url: &str) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of one ascending page of candles starting at `since_ms`
    pub fn page_url(&self, key: &SeriesKey, since_ms: i64) -> String {
        format!(
            "{}/candles/trade:{}:{}/hist?limit={}&start={}&sort=1",
            self.base_url, key.timeframe, key.pair, PAGE_LIMIT, since_ms
        )
    }
}

#[async_trait]
impl CandleSource for BitfinexClient {
    async fn fetch_page(&self, key: &SeriesKey, since_ms: i64) -> Result<RawResponse, ExchangeError> {
        let url = self.page_url(key, since_ms);
        debug!("GET {}", url);

        // Error payloads arrive with 4xx/5xx statuses, so the body is
        // decoded whatever the status.
        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        let value: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|source| ExchangeError::Decode { status, source })?;

        RawResponse::from_value(value)
    }
}
