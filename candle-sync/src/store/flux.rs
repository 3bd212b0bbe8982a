//! Flux query text and CSV result parsing

use crate::data::SeriesKey;
use crate::error::StoreError;
use chrono::{DateTime, Utc};

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Query for the most recent `open` sample of a series
///
/// `open` is only an existence probe; every point carries all five fields.
pub fn last_sample_query(bucket: &str, lookback: &str, key: &SeriesKey) -> String {
    format!(
        "from(bucket: {bucket})\n  \
         |> range(start: {lookback})\n  \
         |> filter(fn: (r) => r[\"_measurement\"] == {measurement})\n  \
         |> filter(fn: (r) => r[\"timeframe\"] == {timeframe})\n  \
         |> filter(fn: (r) => r[\"_field\"] == \"open\")\n  \
         |> last(column: \"_time\")\n  \
         |> yield(name: \"last\")",
        bucket = quote(bucket),
        lookback = lookback,
        measurement = quote(&key.pair),
        timeframe = quote(key.timeframe.as_str()),
    )
}

/// Latest `_time` value in a CSV query response
///
/// Annotation rows (`#...`) and blank lines are skipped; every row that
/// contains a `_time` cell is a header for the rows that follow it. A body
/// without a `_time` column or without data rows yields `None`.
pub fn parse_latest_time(body: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(body.as_bytes());

    let mut time_column: Option<usize> = None;
    let mut latest: Option<DateTime<Utc>> = None;

    for record in reader.records() {
        let record = record?;
        if let Some(idx) = record.iter().position(|cell| cell == "_time") {
            time_column = Some(idx);
            continue;
        }
        let Some(idx) = time_column else {
            continue;
        };
        let Some(cell) = record.get(idx).filter(|cell| !cell.is_empty()) else {
            continue;
        };

        let time = DateTime::parse_from_rfc3339(cell)
            .map_err(|e| StoreError::InvalidTimestamp(format!("{}: {}", cell, e)))?
            .with_timezone(&Utc);
        latest = latest.max(Some(time));
    }

    Ok(latest)
}
