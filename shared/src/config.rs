use anyhow::{anyhow, Context};
use dotenv::dotenv;
use std::str::FromStr;

/// Log output format of the binaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow!("unknown log format '{}'", other)),
        }
    }
}

#[derive(Debug)]
pub struct Config {
    /// MySQL URL of the pair/timeframe tables, if configured
    pub database_url: Option<String>,
    pub influx_url: String,
    pub influx_token: String,
    pub influx_org: String,
    pub influx_bucket: String,
    /// Flux `range(start:)` used when looking up the last stored point
    pub influx_lookback: String,
    pub api_base_url: String,
    pub starting_year: i32,
    pub request_delay_secs: u64,
    pub rate_limit_pause_secs: u64,
    pub maintenance_pause_secs: u64,
    pub max_attempts: u32,
    pub concurrency: usize,
    /// Comma separated pairs; overrides the `pair` table
    pub sync_pairs: Option<String>,
    /// Comma separated interval codes; overrides the `timeframe` table
    pub sync_timeframes: Option<String>,
    pub run_migrations: bool,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| var(key).ok_or_else(|| anyhow!("{} must be set", key));

        let database_url = var("DATABASE_URL").or_else(|| {
            var("MYSQL_HOST").map(|host| {
                format!(
                    "mysql://{}:{}@{}/{}",
                    var("MYSQL_USER").unwrap_or_else(|| "root".to_string()),
                    var("MYSQL_PASSWORD").unwrap_or_default(),
                    host,
                    var("MYSQL_DATABASE").unwrap_or_else(|| "exchange".to_string()),
                )
            })
        });

        Ok(Config {
            database_url,
            influx_url: var("INFLUX_URL").unwrap_or_else(|| "http://localhost:8086".to_string()),
            influx_token: required("INFLUX_TOKEN")?,
            influx_org: required("INFLUX_ORG")?,
            influx_bucket: required("INFLUX_BUCKET")?,
            influx_lookback: var("INFLUX_LOOKBACK").unwrap_or_else(|| "-9999d".to_string()),
            api_base_url: var("API_BASE_URL")
                .unwrap_or_else(|| "https://api-pub.bitfinex.com/v2".to_string()),
            starting_year: parse_or(var("STARTING_YEAR"), "STARTING_YEAR", 2019)?,
            request_delay_secs: parse_or(var("REQUEST_DELAY"), "REQUEST_DELAY", 1)?,
            rate_limit_pause_secs: parse_or(var("RATE_LIMIT_PAUSE"), "RATE_LIMIT_PAUSE", 20)?,
            maintenance_pause_secs: parse_or(var("MAINTENANCE_PAUSE"), "MAINTENANCE_PAUSE", 1)?,
            max_attempts: parse_or(var("SYNC_MAX_ATTEMPTS"), "SYNC_MAX_ATTEMPTS", 10)?,
            concurrency: parse_or(var("SYNC_CONCURRENCY"), "SYNC_CONCURRENCY", 1)?,
            sync_pairs: var("SYNC_PAIRS"),
            sync_timeframes: var("SYNC_TIMEFRAMES"),
            run_migrations: parse_or(var("RUN_MIGRATIONS"), "RUN_MIGRATIONS", false)?,
            log_format: parse_or(var("LOG_FORMAT"), "LOG_FORMAT", LogFormat::Pretty)?,
        })
    }

    /// Both symbol lists come from the environment, so MySQL is not needed
    pub fn has_static_symbols(&self) -> bool {
        self.sync_pairs.is_some() && self.sync_timeframes.is_some()
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("invalid value '{}' for {}", raw, key)),
        None => Ok(default),
    }
}
