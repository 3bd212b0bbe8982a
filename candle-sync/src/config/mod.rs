//! Configuration module

pub mod retry;
pub mod store;
pub mod runtime;

pub use retry::*;
pub use store::*;
pub use runtime::*;
