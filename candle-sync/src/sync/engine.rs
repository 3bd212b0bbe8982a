//! Incremental catch-up loop

use crate::config::SyncConfig;
use crate::data::{encode, SeriesKey, NANOS_PER_MILLI};
use crate::error::{Result, SyncError};
use crate::exchange::{CandleSource, RawResponse, SignalKind};
use crate::store::SeriesStore;
use crate::symbols::{series_keys, SymbolSource};
use crate::sync::{CheckpointResolver, RunSummary, SeriesFailure, SeriesReport};
use chrono::{DateTime, Utc};
use futures::{stream, StreamExt};
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Syncs candle series from an exchange into a store
///
/// The engine owns its client, store and configuration; nothing is shared
/// through globals, so several engines can live in one process.
pub struct SyncEngine<C, S> {
    client: C,
    store: S,
    config: SyncConfig,
    history_start: DateTime<Utc>,
}

impl<C: CandleSource, S: SeriesStore> SyncEngine<C, S> {
    pub fn new(client: C, store: S, config: SyncConfig) -> Result<Self> {
        config.validate()?;
        let history_start = config.history_start()?;
        Ok(Self {
            client,
            store,
            config,
            history_start,
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Sync every pair x timeframe combination the symbol source lists
    ///
    /// Only a failure to load the symbol lists aborts the run; a failing
    /// series is logged and reported in the summary.
    pub async fn run(&self, symbols: &dyn SymbolSource) -> Result<RunSummary> {
        let pairs = symbols
            .pairs()
            .await
            .map_err(|e| SyncError::Symbols(format!("{:#}", e)))?;
        let timeframes = symbols
            .timeframes()
            .await
            .map_err(|e| SyncError::Symbols(format!("{:#}", e)))?;

        let keys = series_keys(&pairs, &timeframes);
        info!(
            "Syncing {} series ({} pairs, {} timeframes, concurrency {})",
            keys.len(),
            pairs.len(),
            timeframes.len(),
            self.config.concurrency
        );

        Ok(self.sync_all(keys).await)
    }

    /// Sync the given series, at most `concurrency` at a time
    pub async fn sync_all(&self, keys: Vec<SeriesKey>) -> RunSummary {
        let results: Vec<(SeriesKey, Result<SeriesReport>)> = stream::iter(keys)
            .map(|key| async move {
                let span = info_span!("series", pair = %key.pair, timeframe = %key.timeframe);
                let result = self.sync_series(&key).instrument(span).await;
                if let Err(e) = &result {
                    error!("Failed to sync {}: {}", key, e);
                }
                (key, result)
            })
            .buffered(self.config.concurrency)
            .collect()
            .await;

        let mut summary = RunSummary::default();
        for (key, result) in results {
            match result {
                Ok(report) => summary.synced.push(report),
                Err(error) => summary.failed.push(SeriesFailure { key, error }),
            }
        }
        summary
    }

    /// Page forward from the stored checkpoint until the series is caught up
    pub async fn sync_series(&self, key: &SeriesKey) -> Result<SeriesReport> {
        let checkpoint = CheckpointResolver::new(&self.store, self.history_start)
            .last_checkpoint(key)
            .await?;
        let mut cursor_ns = checkpoint
            .timestamp_nanos_opt()
            .ok_or_else(|| SyncError::Config(format!("checkpoint {} is out of range", checkpoint)))?;

        let mut report = SeriesReport::new(key.clone(), checkpoint);
        let mut signal_attempts: u32 = 0;
        let mut write_attempts: u32 = 0;
        // A backoff pause already spaces out the next request
        let mut backed_off = false;
        let max_attempts = self.config.retry.max_attempts;

        info!("Syncing {} from {}", key, checkpoint);

        loop {
            if report.fetches > 0 && !backed_off {
                pause(self.config.request_delay).await;
            }
            backed_off = false;

            let response = self
                .client
                .fetch_page(key, cursor_ns / NANOS_PER_MILLI)
                .await?;
            report.fetches += 1;

            let candles = match response {
                RawResponse::Page(candles) => {
                    signal_attempts = 0;
                    candles
                }
                RawResponse::Signal(signal) => {
                    signal_attempts += 1;
                    if signal_attempts >= max_attempts {
                        return Err(SyncError::RetriesExhausted {
                            key: key.clone(),
                            attempts: signal_attempts,
                            last_error: signal.to_string(),
                        });
                    }

                    let kind = signal.kind();
                    let delay = self.config.retry.pause_for_signal(kind, signal_attempts);
                    match kind {
                        SignalKind::RateLimited => {
                            info!("Reached the request limit ({}). Waiting {:?}...", signal, delay)
                        }
                        SignalKind::Maintenance => {
                            info!("Platform is in maintenance ({}). Waiting {:?}...", signal, delay)
                        }
                        SignalKind::Other => {
                            warn!("Exchange answered with {}. Retrying in {:?}", signal, delay)
                        }
                    }

                    report.waits += 1;
                    pause(delay).await;
                    backed_off = true;
                    continue;
                }
            };

            // Pages are ascending and `start` is inclusive: a tail at (or
            // before) the cursor means nothing newer exists.
            let Some(last) = candles.last() else {
                info!("Correctly synced {} (no candles from {})", key, report.checkpoint);
                break;
            };
            let last_ns = last.timestamp_ns();
            if last_ns <= cursor_ns {
                info!("Correctly synced {} up to {}", key, report.checkpoint);
                break;
            }

            let points = encode(key, &candles);
            match self.store.write_points(&points).await {
                Ok(()) => {
                    write_attempts = 0;
                    cursor_ns = last_ns;
                    report.writes += 1;
                    report.points_written += points.len();
                    report.checkpoint = DateTime::from_timestamp_nanos(cursor_ns);
                    debug!("Stored {} points for {}, now at {}", points.len(), key, report.checkpoint);
                }
                Err(e) => {
                    write_attempts += 1;
                    report.write_failures += 1;
                    if write_attempts >= max_attempts {
                        return Err(SyncError::RetriesExhausted {
                            key: key.clone(),
                            attempts: write_attempts,
                            last_error: e.to_string(),
                        });
                    }

                    let delay = self.config.retry.write.delay_for_attempt(write_attempts);
                    warn!("Couldn't write into the store: {}. Retrying in {:?}", e, delay);
                    report.waits += 1;
                    pause(delay).await;
                    backed_off = true;
                }
            }
        }

        Ok(report)
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
