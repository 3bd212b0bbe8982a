//! Time-series store configuration

/// Connection settings for the InfluxDB v2 HTTP API
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL (e.g., "http://localhost:8086")
    pub url: String,
    /// API token
    pub token: String,
    /// Organization name
    pub org: String,
    /// Bucket name
    pub bucket: String,
    /// Flux `range(start:)` used by the checkpoint query
    pub lookback: String,
}

impl StoreConfig {
    pub fn new(url: &str, token: &str, org: &str, bucket: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            org: org.to_string(),
            bucket: bucket.to_string(),
            lookback: DEFAULT_LOOKBACK.to_string(),
        }
    }

    pub fn with_lookback(mut self, lookback: &str) -> Self {
        self.lookback = lookback.to_string();
        self
    }
}

/// Far enough back to cover the whole history
pub const DEFAULT_LOOKBACK: &str = "-9999d";
