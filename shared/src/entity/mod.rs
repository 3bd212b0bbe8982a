//! `SeaORM` entities of the sync configuration tables

pub mod pair;
pub mod timeframe;
