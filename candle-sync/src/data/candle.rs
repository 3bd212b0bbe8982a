//! Raw OHLCV candles as served by the history endpoint

use serde::{Deserialize, Deserializer};

pub const NANOS_PER_MILLI: i64 = 1_000_000;

/// One candle as received from the exchange
///
/// The wire shape is `[mts, open, close, high, low, volume]`. Close comes
/// before high and low, so fields are mapped by position, never by the
/// conventional OHLC order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    /// Bucket start, milliseconds since the Unix epoch
    pub mts: i64,
    /// Opening price
    pub open: f64,
    /// Closing price
    pub close: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Volume
    pub volume: f64,
}

impl Candle {
    /// Create a new candle in wire order
    pub fn new(mts: i64, open: f64, close: f64, high: f64, low: f64, volume: f64) -> Self {
        Self {
            mts,
            open,
            close,
            high,
            low,
            volume,
        }
    }

    /// Bucket start in nanoseconds
    pub fn timestamp_ns(&self) -> i64 {
        self.mts.saturating_mul(NANOS_PER_MILLI)
    }
}

/// A numeric cell; the exchange sends numbers, some proxies send strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl WireNumber {
    fn as_f64(&self) -> Result<f64, String> {
        let value = match self {
            WireNumber::Int(v) => *v as f64,
            WireNumber::Float(v) => *v,
            WireNumber::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", s))?,
        };
        // Line protocol has no representation for NaN or infinities
        if !value.is_finite() {
            return Err(format!("{} is not a finite number", value));
        }
        Ok(value)
    }

    fn as_millis(&self) -> Result<i64, String> {
        match self {
            WireNumber::Int(v) => Ok(*v),
            WireNumber::Float(v) if v.fract() == 0.0 => Ok(*v as i64),
            WireNumber::Float(v) => Err(format!("{} is not an integer timestamp", v)),
            WireNumber::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("'{}' is not an integer timestamp", s)),
        }
    }
}

#[derive(Deserialize)]
struct WireCandle(WireNumber, WireNumber, WireNumber, WireNumber, WireNumber, WireNumber);

impl TryFrom<WireCandle> for Candle {
    type Error = String;

    fn try_from(wire: WireCandle) -> Result<Self, Self::Error> {
        let WireCandle(mts, open, close, high, low, volume) = wire;
        Ok(Candle::new(
            mts.as_millis()?,
            open.as_f64()?,
            close.as_f64()?,
            high.as_f64()?,
            low.as_f64()?,
            volume.as_f64()?,
        ))
    }
}

impl<'de> Deserialize<'de> for Candle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireCandle::deserialize(deserializer)?;
        Candle::try_from(wire).map_err(serde::de::Error::custom)
    }
}
