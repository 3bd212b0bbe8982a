//! Outcome of a sync run

use crate::data::SeriesKey;
use crate::error::SyncError;
use chrono::{DateTime, Utc};

/// Counters for one series that reached the caught-up state
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesReport {
    pub key: SeriesKey,
    /// Checkpoint the loop started from
    pub started_from: DateTime<Utc>,
    /// Timestamp of the last candle known to be stored
    pub checkpoint: DateTime<Utc>,
    /// Page requests issued, including retried ones
    pub fetches: u32,
    /// Successful batch writes
    pub writes: u32,
    /// Backoff pauses after exchange signals or failed writes
    pub waits: u32,
    pub write_failures: u32,
    pub points_written: usize,
}

impl SeriesReport {
    pub fn new(key: SeriesKey, started_from: DateTime<Utc>) -> Self {
        Self {
            key,
            started_from,
            checkpoint: started_from,
            fetches: 0,
            writes: 0,
            waits: 0,
            write_failures: 0,
            points_written: 0,
        }
    }
}

#[derive(Debug)]
pub struct SeriesFailure {
    pub key: SeriesKey,
    pub error: SyncError,
}

/// Result of syncing every configured series
#[derive(Debug, Default)]
pub struct RunSummary {
    pub synced: Vec<SeriesReport>,
    pub failed: Vec<SeriesFailure>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total_points(&self) -> usize {
        self.synced.iter().map(|r| r.points_written).sum()
    }
}
