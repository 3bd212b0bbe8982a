use crate::repositories::SymbolRepository;
use anyhow::{bail, Result};
use async_trait::async_trait;
use candle_sync::config::{Backoff, RetryPolicy, StoreConfig, SyncConfig};
use candle_sync::exchange::BitfinexClient;
use candle_sync::store::InfluxStore;
use candle_sync::symbols::{parse_list, SymbolSource};
use candle_sync::sync::SyncEngine;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use shared::{get_db_connection, Config};
use std::sync::Arc;
use std::time::Duration;

const RATE_LIMIT_PAUSE_CAP: Duration = Duration::from_secs(120);
const RETRY_PAUSE_CAP: Duration = Duration::from_secs(30);

pub struct AppState {
    pub config: Config,
    pub db: Option<Arc<DatabaseConnection>>,
    pub engine: SyncEngine<BitfinexClient, InfluxStore>,
    pub symbols: SymbolLists,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let needs_db = config.run_migrations || !config.has_static_symbols();
        let db = match (&config.database_url, needs_db) {
            (Some(url), true) => {
                let db = get_db_connection(url).await?;
                tracing::info!("Connected to database successfully");
                Some(Arc::new(db))
            }
            (None, true) => bail!(
                "DATABASE_URL or MYSQL_HOST must be set unless SYNC_PAIRS and SYNC_TIMEFRAMES are both given"
            ),
            (_, false) => None,
        };

        let sync_config = sync_config(&config);
        let client = BitfinexClient::new(&config.api_base_url)?;
        let store = InfluxStore::new(store_config(&config))?;
        let engine = SyncEngine::new(client, store, sync_config)?;

        let symbols = SymbolLists {
            pairs: config.sync_pairs.as_deref().map(parse_list),
            timeframes: config.sync_timeframes.as_deref().map(parse_list),
            repository: db.clone().map(SymbolRepository::new),
        };

        Ok(AppState {
            config,
            db,
            engine,
            symbols,
        })
    }

    /// Create the pair/timeframe tables if they are missing
    pub async fn migrate(&self) -> Result<()> {
        let Some(db) = &self.db else {
            bail!("RUN_MIGRATIONS needs a database connection");
        };
        Migrator::up(db.as_ref(), None).await?;
        tracing::info!("Migrations applied");
        Ok(())
    }
}

pub fn sync_config(config: &Config) -> SyncConfig {
    let request_delay = Duration::from_secs(config.request_delay_secs);
    let rate_limit_pause = Duration::from_secs(config.rate_limit_pause_secs);

    SyncConfig {
        start_year: config.starting_year,
        request_delay,
        retry: RetryPolicy {
            max_attempts: config.max_attempts,
            rate_limit: Backoff::exponential(rate_limit_pause, rate_limit_pause.max(RATE_LIMIT_PAUSE_CAP)),
            maintenance: Backoff::fixed(Duration::from_secs(config.maintenance_pause_secs)),
            other: Backoff::exponential(request_delay, request_delay.max(RETRY_PAUSE_CAP)),
            write: Backoff::exponential(request_delay, request_delay.max(RETRY_PAUSE_CAP)),
        },
        concurrency: config.concurrency,
    }
}

pub fn store_config(config: &Config) -> StoreConfig {
    StoreConfig::new(
        &config.influx_url,
        &config.influx_token,
        &config.influx_org,
        &config.influx_bucket,
    )
    .with_lookback(&config.influx_lookback)
}

/// Symbol lists from the environment, falling back to the MySQL tables
/// for whichever list is not given
pub struct SymbolLists {
    pairs: Option<Vec<String>>,
    timeframes: Option<Vec<String>>,
    repository: Option<SymbolRepository>,
}

#[async_trait]
impl SymbolSource for SymbolLists {
    async fn pairs(&self) -> Result<Vec<String>> {
        match (&self.pairs, &self.repository) {
            (Some(pairs), _) => Ok(pairs.clone()),
            (None, Some(repository)) => repository.pairs().await,
            (None, None) => bail!("no pair list configured"),
        }
    }

    async fn timeframes(&self) -> Result<Vec<String>> {
        match (&self.timeframes, &self.repository) {
            (Some(timeframes), _) => Ok(timeframes.clone()),
            (None, Some(repository)) => repository.timeframes().await,
            (None, None) => bail!("no timeframe list configured"),
        }
    }
}
