//! Data module
//!
//! Series identity, raw candles and the points written to the store.

pub mod candle;
pub mod point;
pub mod series;

pub use candle::*;
pub use point::*;
pub use series::*;
