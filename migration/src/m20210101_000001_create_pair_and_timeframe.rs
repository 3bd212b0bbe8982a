use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pair::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Pair::Id).unsigned().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Pair::Name).string_len(32).not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Timeframe::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Timeframe::Id).unsigned().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Timeframe::Interval).string_len(8).not_null().unique_key())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Timeframe::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Pair::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Pair {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Timeframe {
    Table,
    Id,
    Interval,
}
