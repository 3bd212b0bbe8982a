//! Time-series storage
//!
//! The engine writes points and reads back the newest timestamp of a series
//! through [`SeriesStore`]. Writes at an existing (measurement, tags,
//! timestamp) overwrite, which is what makes re-running a sync idempotent.

pub mod flux;
pub mod influx;

pub use influx::InfluxStore;

use crate::data::{Point, SeriesKey};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// Persist a batch of points
    async fn write_points(&self, points: &[Point]) -> Result<(), StoreError>;

    /// Timestamp of the newest stored point of a series, if any
    async fn latest_timestamp(&self, key: &SeriesKey) -> Result<Option<DateTime<Utc>>, StoreError>;
}
