pub use sea_orm_migration::prelude::*;

mod m20210101_000001_create_pair_and_timeframe;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20210101_000001_create_pair_and_timeframe::Migration)]
    }
}
