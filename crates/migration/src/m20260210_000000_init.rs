//! Initial schema migration - creates all tables from scratch.
//!
//! Consolidated schema for Tally:
//!
//! - `workspaces`: ledger containers owned by external users
//! - `accounts`: money locations inside a workspace (cash, bank, card)
//! - `categories`: income/expense classification
//! - `tags`: free-form labels, linked many-to-many
//! - `debts`: amortized debts settled by linked operations
//! - `operations`: ledger entries, including transfer leg pairs
//! - `operation_tags`: operation/tag links

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Workspaces {
    Table,
    Id,
    Name,
    BaseCurrency,
    OwnerId,
    CreatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    WorkspaceId,
    Name,
    Color,
    IsDefault,
    Archived,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    WorkspaceId,
    Name,
    NameNorm,
    Kind,
    Archived,
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
    WorkspaceId,
    Name,
    NameNorm,
}

#[derive(Iden)]
enum Debts {
    Table,
    Id,
    WorkspaceId,
    Direction,
    Title,
    Counterparty,
    InitialMinor,
    OpenedOn,
    DueOn,
    Notes,
    Archived,
}

#[derive(Iden)]
enum Operations {
    Table,
    Id,
    WorkspaceId,
    Kind,
    AmountMinor,
    Currency,
    ExchangeRate,
    BaseAmountMinor,
    AccountId,
    TransferDirection,
    TransferGroupId,
    CategoryId,
    DebtId,
    DebtAppliedMinor,
    Note,
    OccurredOn,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum OperationTags {
    Table,
    OperationId,
    TagId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Workspaces
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Workspaces::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Workspaces::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Workspaces::Name).string().not_null())
                    .col(
                        ColumnDef::new(Workspaces::BaseCurrency)
                            .string()
                            .not_null()
                            .default("EUR"),
                    )
                    .col(ColumnDef::new(Workspaces::OwnerId).string().not_null())
                    .col(
                        ColumnDef::new(Workspaces::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-workspaces-owner_id")
                    .table(Workspaces::Table)
                    .col(Workspaces::OwnerId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::WorkspaceId).uuid().not_null())
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(ColumnDef::new(Accounts::Color).string())
                    .col(ColumnDef::new(Accounts::IsDefault).boolean().not_null())
                    .col(ColumnDef::new(Accounts::Archived).boolean().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-workspace_id")
                            .from(Accounts::Table, Accounts::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-workspace_id-name-unique")
                    .table(Accounts::Table)
                    .col(Accounts::WorkspaceId)
                    .col(Accounts::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::WorkspaceId).uuid().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameNorm).string().not_null())
                    .col(ColumnDef::new(Categories::Kind).string().not_null())
                    .col(ColumnDef::new(Categories::Archived).boolean().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-workspace_id")
                            .from(Categories::Table, Categories::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-workspace_id-name_norm-unique")
                    .table(Categories::Table)
                    .col(Categories::WorkspaceId)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Tags
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tags::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tags::WorkspaceId).uuid().not_null())
                    .col(ColumnDef::new(Tags::Name).string().not_null())
                    .col(ColumnDef::new(Tags::NameNorm).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tags-workspace_id")
                            .from(Tags::Table, Tags::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-tags-workspace_id-name_norm-unique")
                    .table(Tags::Table)
                    .col(Tags::WorkspaceId)
                    .col(Tags::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Debts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Debts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Debts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Debts::WorkspaceId).uuid().not_null())
                    .col(ColumnDef::new(Debts::Direction).string().not_null())
                    .col(ColumnDef::new(Debts::Title).string().not_null())
                    .col(ColumnDef::new(Debts::Counterparty).string().not_null())
                    .col(ColumnDef::new(Debts::InitialMinor).big_integer().not_null())
                    .col(ColumnDef::new(Debts::OpenedOn).date().not_null())
                    .col(ColumnDef::new(Debts::DueOn).date())
                    .col(ColumnDef::new(Debts::Notes).string())
                    .col(ColumnDef::new(Debts::Archived).boolean().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-debts-workspace_id")
                            .from(Debts::Table, Debts::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Operations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Operations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Operations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Operations::WorkspaceId).uuid().not_null())
                    .col(ColumnDef::new(Operations::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Operations::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Operations::Currency).string().not_null())
                    .col(ColumnDef::new(Operations::ExchangeRate).double())
                    .col(ColumnDef::new(Operations::BaseAmountMinor).big_integer())
                    .col(ColumnDef::new(Operations::AccountId).uuid())
                    .col(ColumnDef::new(Operations::TransferDirection).string())
                    .col(ColumnDef::new(Operations::TransferGroupId).uuid())
                    .col(ColumnDef::new(Operations::CategoryId).uuid())
                    .col(ColumnDef::new(Operations::DebtId).uuid())
                    .col(ColumnDef::new(Operations::DebtAppliedMinor).big_integer())
                    .col(ColumnDef::new(Operations::Note).string())
                    .col(ColumnDef::new(Operations::OccurredOn).date().not_null())
                    .col(ColumnDef::new(Operations::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(Operations::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-operations-workspace_id")
                            .from(Operations::Table, Operations::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-operations-account_id")
                            .from(Operations::Table, Operations::AccountId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-operations-category_id")
                            .from(Operations::Table, Operations::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-operations-debt_id")
                            .from(Operations::Table, Operations::DebtId)
                            .to(Debts::Table, Debts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-operations-workspace_id-occurred_on")
                    .table(Operations::Table)
                    .col(Operations::WorkspaceId)
                    .col(Operations::OccurredOn)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-operations-transfer_group_id")
                    .table(Operations::Table)
                    .col(Operations::TransferGroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-operations-debt_id")
                    .table(Operations::Table)
                    .col(Operations::DebtId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Operation tags
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(OperationTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OperationTags::OperationId).uuid().not_null())
                    .col(ColumnDef::new(OperationTags::TagId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(OperationTags::OperationId)
                            .col(OperationTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-operation_tags-operation_id")
                            .from(OperationTags::Table, OperationTags::OperationId)
                            .to(Operations::Table, Operations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-operation_tags-tag_id")
                            .from(OperationTags::Table, OperationTags::TagId)
                            .to(Tags::Table, Tags::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OperationTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Operations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Debts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Workspaces::Table).to_owned())
            .await?;
        Ok(())
    }
}
