//! Candle-Sync: incremental OHLCV history sync
//!
//! Pulls historical candles from the Bitfinex public API and stores them in
//! InfluxDB, one series per (pair, timeframe):
//! - [`exchange`] pages through the candle history endpoint
//! - [`data`] turns candles into time-series points
//! - [`store`] writes points and finds where a series left off
//! - [`sync`] drives each series from its checkpoint until caught up
//!
//! # Example
//!
//! ```no_run
//! use candle_sync::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = SyncConfig::default();
//!     let client = BitfinexClient::new(DEFAULT_API_BASE_URL)?;
//!     let store = InfluxStore::new(StoreConfig::new(
//!         "http://localhost:8086",
//!         "token",
//!         "org",
//!         "candles",
//!     ))?;
//!     let engine = SyncEngine::new(client, store, config)?;
//!     let symbols = StaticSymbols::from_lists("tBTCUSD", "1m,1h");
//!     let summary = engine.run(&symbols).await?;
//!     println!("{} points written", summary.total_points());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod exchange;
pub mod store;
pub mod symbols;
pub mod sync;

// Re-export commonly used types
pub mod prelude {
    pub use crate::config::*;
    pub use crate::data::*;
    pub use crate::error::*;
    pub use crate::exchange::*;
    pub use crate::store::{InfluxStore, SeriesStore};
    pub use crate::symbols::*;
    pub use crate::sync::*;
}

pub use error::{Result, SyncError};
