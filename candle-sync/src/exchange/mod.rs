//! Exchange integration module
//!
//! Paged access to the Bitfinex candle history endpoint.

pub mod client;
pub mod response;

pub use client::*;
pub use response::*;
