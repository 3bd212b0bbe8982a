//! Runtime configuration of the sync engine

use crate::config::RetryPolicy;
use crate::error::SyncError;
use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;

/// Sync engine configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Series with no stored data start at January 1st of this year (UTC)
    pub start_year: i32,
    /// Pause between consecutive page requests of one series
    pub request_delay: Duration,
    /// Backoff and retry ceiling
    pub retry: RetryPolicy,
    /// Number of series synced at the same time
    pub concurrency: usize,
}

impl SyncConfig {
    /// Start-of-history instant used when a series has no checkpoint
    pub fn history_start(&self) -> Result<DateTime<Utc>, SyncError> {
        Utc.with_ymd_and_hms(self.start_year, 1, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| SyncError::Config(format!("invalid start year {}", self.start_year)))
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        // Cursors are held in i64 nanoseconds (years 1677..=2262)
        let start = self.history_start()?;
        if start.timestamp_nanos_opt().is_none() {
            return Err(SyncError::Config(format!(
                "start year {} is outside the nanosecond timestamp range",
                self.start_year
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(SyncError::Config("max_attempts must be at least 1".to_string()));
        }
        if self.concurrency == 0 {
            return Err(SyncError::Config("concurrency must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            start_year: 2019,
            request_delay: Duration::from_secs(1),
            retry: RetryPolicy::default(),
            concurrency: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_start() {
        let config = SyncConfig {
            start_year: 1970,
            ..Default::default()
        };
        assert_eq!(config.history_start().unwrap(), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = SyncConfig::default();
        assert!(config.validate().is_ok());

        config.concurrency = 0;
        assert!(matches!(config.validate(), Err(SyncError::Config(_))));

        config.concurrency = 1;
        config.retry.max_attempts = 0;
        assert!(matches!(config.validate(), Err(SyncError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_start_beyond_nanosecond_range() {
        let config = SyncConfig {
            start_year: 2300,
            ..Default::default()
        };
        assert!(config.history_start().is_ok());
        assert!(matches!(config.validate(), Err(SyncError::Config(_))));

        let config = SyncConfig {
            start_year: 2262,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
