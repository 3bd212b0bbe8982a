use anyhow::{Context, Result};
use async_trait::async_trait;
use candle_sync::symbols::SymbolSource;
use sea_orm::prelude::*;
use sea_orm::QueryOrder;
use shared::entity::{pair, timeframe};
use std::sync::Arc;

/// Reads the tracked pairs and timeframes from the MySQL config tables
pub struct SymbolRepository {
    db: Arc<DatabaseConnection>,
}

impl SymbolRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list_pairs(&self) -> Result<Vec<pair::Model>> {
        let pairs = pair::Entity::find()
            .order_by_asc(pair::Column::Id)
            .all(self.db.as_ref())
            .await
            .context("failed to read the pair table")?;
        Ok(pairs)
    }

    pub async fn list_timeframes(&self) -> Result<Vec<timeframe::Model>> {
        let timeframes = timeframe::Entity::find()
            .order_by_asc(timeframe::Column::Id)
            .all(self.db.as_ref())
            .await
            .context("failed to read the timeframe table")?;
        Ok(timeframes)
    }
}

#[async_trait]
impl SymbolSource for SymbolRepository {
    async fn pairs(&self) -> Result<Vec<String>> {
        Ok(self.list_pairs().await?.into_iter().map(|p| p.name).collect())
    }

    async fn timeframes(&self) -> Result<Vec<String>> {
        Ok(self
            .list_timeframes()
            .await?
            .into_iter()
            .map(|t| t.interval)
            .collect())
    }
}
