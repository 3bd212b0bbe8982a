//! Sync module
//!
//! Checkpoint resolution, the per-series catch-up loop and run reporting.

pub mod checkpoint;
pub mod engine;
pub mod report;

pub use checkpoint::*;
pub use engine::*;
pub use report::*;
