pub mod database;
pub mod config;
pub mod entity;

pub use database::get_db_connection;
pub use config::{Config, LogFormat};
