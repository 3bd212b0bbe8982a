//! InfluxDB v2 HTTP store

use crate::config::StoreConfig;
use crate::data::{to_line_protocol, Point, SeriesKey};
use crate::error::StoreError;
use crate::store::{flux, SeriesStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

/// Store backed by the InfluxDB v2 write and query APIs
#[derive(Debug, Clone)]
pub struct InfluxStore {
    config: StoreConfig,
    client: Client,
}

impl InfluxStore {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.config.token)
    }

    async fn ensure_success(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl SeriesStore for InfluxStore {
    async fn write_points(&self, points: &[Point]) -> Result<(), StoreError> {
        if points.is_empty() {
            return Ok(());
        }

        let url = format!("{}/api/v2/write", self.config.url);
        debug!("Writing {} points to bucket {}", points.len(), self.config.bucket);

        let response = self
            .client
            .post(&url)
            .query(&[
                ("org", self.config.org.as_str()),
                ("bucket", self.config.bucket.as_str()),
                ("precision", "ns"),
            ])
            .header(AUTHORIZATION, self.auth_header())
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(to_line_protocol(points))
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn latest_timestamp(&self, key: &SeriesKey) -> Result<Option<DateTime<Utc>>, StoreError> {
        let url = format!("{}/api/v2/query", self.config.url);
        let query = flux::last_sample_query(&self.config.bucket, &self.config.lookback, key);

        let response = self
            .client
            .post(&url)
            .query(&[("org", self.config.org.as_str())])
            .header(AUTHORIZATION, self.auth_header())
            .header(CONTENT_TYPE, "application/vnd.flux")
            .header(ACCEPT, "application/csv")
            .body(query)
            .send()
            .await?;

        let body = Self::ensure_success(response).await?.text().await?;
        flux::parse_latest_time(&body)
    }
}
