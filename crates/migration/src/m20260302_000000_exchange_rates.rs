//! Per-workspace exchange rate observations.
//!
//! One row per `(workspace, from, to, rate_date)`; the feed refresh path
//! upserts on that key, so replays are idempotent.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum ExchangeRates {
    Table,
    Id,
    WorkspaceId,
    FromCurrency,
    ToCurrency,
    RateDate,
    Rate,
    Source,
}

#[derive(Iden)]
enum Workspaces {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ExchangeRates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExchangeRates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExchangeRates::WorkspaceId).uuid().not_null())
                    .col(
                        ColumnDef::new(ExchangeRates::FromCurrency)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExchangeRates::ToCurrency)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExchangeRates::RateDate).date().not_null())
                    .col(ColumnDef::new(ExchangeRates::Rate).double().not_null())
                    .col(ColumnDef::new(ExchangeRates::Source).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-exchange_rates-workspace_id")
                            .from(ExchangeRates::Table, ExchangeRates::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-exchange_rates-key-unique")
                    .table(ExchangeRates::Table)
                    .col(ExchangeRates::WorkspaceId)
                    .col(ExchangeRates::FromCurrency)
                    .col(ExchangeRates::ToCurrency)
                    .col(ExchangeRates::RateDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExchangeRates::Table).to_owned())
            .await?;
        Ok(())
    }
}
