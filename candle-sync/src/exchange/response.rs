//! Response classification for the candle history endpoint

use crate::data::Candle;
use crate::error::ExchangeError;
use serde_json::Value;
use std::fmt;

pub const ERROR_CODE_SUBSCRIPTION_FAILED: i64 = 10300;
pub const ERROR_CODE_RATE_LIMIT: i64 = 11010;
pub const ERROR_CODE_START_MAINTENANCE: i64 = 20006;
pub const INFO_CODE_RECONNECT: i64 = 20051;

/// What an error signal asks the caller to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    RateLimited,
    Maintenance,
    Other,
}

/// Error payload sent by the exchange: `["error", code, message]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub code: i64,
    pub message: String,
}

impl Signal {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> SignalKind {
        match self.code {
            ERROR_CODE_RATE_LIMIT => SignalKind::RateLimited,
            ERROR_CODE_START_MAINTENANCE => SignalKind::Maintenance,
            _ => SignalKind::Other,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error {}: {}", self.code, self.message)
    }
}

/// A decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// Candles in ascending time order
    Page(Vec<Candle>),
    /// The exchange refused the request
    Signal(Signal),
}

impl RawResponse {
    /// Classify a JSON body before anything else looks at it
    pub fn from_value(value: Value) -> Result<Self, ExchangeError> {
        match value {
            Value::Array(items) if items.first().and_then(Value::as_str) == Some("error") => {
                let code = items.get(1).and_then(Value::as_i64).ok_or_else(|| {
                    ExchangeError::Malformed(format!("error payload without a code: {:?}", items))
                })?;
                let message = items.get(2).and_then(Value::as_str).unwrap_or_default();
                Ok(RawResponse::Signal(Signal::new(code, message)))
            }
            Value::Array(items) => {
                let candles = items
                    .into_iter()
                    .map(serde_json::from_value::<Candle>)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| ExchangeError::Malformed(format!("bad candle row: {}", e)))?;
                Ok(RawResponse::Page(candles))
            }
            // Shape used with HTTP 429: {"error": "ERR_RATE_LIMIT"}
            Value::Object(map) => match map.get("error").and_then(Value::as_str) {
                Some("ERR_RATE_LIMIT") => Ok(RawResponse::Signal(Signal::new(
                    ERROR_CODE_RATE_LIMIT,
                    "ERR_RATE_LIMIT",
                ))),
                Some(other) => Err(ExchangeError::Malformed(format!(
                    "unexpected error object: {}",
                    other
                ))),
                None => Err(ExchangeError::Malformed(format!(
                    "unexpected object with keys {:?}",
                    map.keys().collect::<Vec<_>>()
                ))),
            },
            other => Err(ExchangeError::Malformed(format!(
                "expected an array, got: {}",
                other
            ))),
        }
    }
}
