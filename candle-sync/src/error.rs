//! Error types for the sync pipeline.

use crate::data::SeriesKey;
use thiserror::Error;

/// Errors raised while talking to the exchange.
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Response (HTTP {status}) is not valid JSON: {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed response payload: {0}")]
    Malformed(String),
}

/// Errors raised by the time-series store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Store rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Unreadable query result: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid timestamp in query result: {0}")]
    InvalidTimestamp(String),
}

/// Top-level sync error.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to load symbols: {0}")]
    Symbols(String),

    #[error("Gave up on {key} after {attempts} consecutive attempts: {last_error}")]
    RetriesExhausted {
        key: SeriesKey,
        attempts: u32,
        last_error: String,
    },
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
