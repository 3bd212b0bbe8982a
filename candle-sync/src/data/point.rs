//! Time-series points and their line protocol encoding

use crate::data::{Candle, SeriesKey, Timeframe};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Persisted record: one candle of one series
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Measurement name (the pair)
    pub measurement: String,
    /// Value of the `timeframe` tag
    pub timeframe: Timeframe,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Nanoseconds since the Unix epoch
    pub timestamp_ns: i64,
}

impl Point {
    pub fn from_candle(key: &SeriesKey, candle: &Candle) -> Self {
        Self {
            measurement: key.pair.clone(),
            timeframe: key.timeframe,
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
            timestamp_ns: candle.timestamp_ns(),
        }
    }

    pub fn time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.timestamp_ns)
    }

    /// Render as one line of InfluxDB line protocol (nanosecond precision)
    pub fn to_line_protocol(&self) -> String {
        let mut line = String::with_capacity(128);
        escape_into(&mut line, &self.measurement, &[',', ' ']);
        line.push_str(",timeframe=");
        escape_into(&mut line, self.timeframe.as_str(), &[',', '=', ' ']);
        // Writing into a String cannot fail.
        let _ = write!(
            line,
            " open={},high={},low={},close={},volume={} {}",
            self.open, self.high, self.low, self.close, self.volume, self.timestamp_ns
        );
        line
    }
}

fn escape_into(out: &mut String, value: &str, special: &[char]) {
    for c in value.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Convert a page of candles into points, preserving order
pub fn encode(key: &SeriesKey, candles: &[Candle]) -> Vec<Point> {
    candles
        .iter()
        .map(|candle| Point::from_candle(key, candle))
        .collect()
}

/// Join points into a line protocol request body
pub fn to_line_protocol(points: &[Point]) -> String {
    points
        .iter()
        .map(Point::to_line_protocol)
        .collect::<Vec<_>>()
        .join("\n")
}
