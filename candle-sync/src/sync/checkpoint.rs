//! Resume point of a series

use crate::data::SeriesKey;
use crate::error::StoreError;
use crate::store::SeriesStore;
use chrono::{DateTime, SubsecRound, Utc};
use tracing::debug;

/// Resolves where a series sync starts
pub struct CheckpointResolver<'a, S: ?Sized> {
    store: &'a S,
    history_start: DateTime<Utc>,
}

impl<'a, S: SeriesStore + ?Sized> CheckpointResolver<'a, S> {
    pub fn new(store: &'a S, history_start: DateTime<Utc>) -> Self {
        Self {
            store,
            history_start,
        }
    }

    /// Newest stored timestamp truncated to whole seconds, or the history
    /// start when the series has never been written
    pub async fn last_checkpoint(&self, key: &SeriesKey) -> Result<DateTime<Utc>, StoreError> {
        match self.store.latest_timestamp(key).await? {
            Some(latest) => Ok(latest.trunc_subsecs(0)),
            None => {
                debug!("No stored data for {}, starting at {}", key, self.history_start);
                Ok(self.history_start)
            }
        }
    }
}
