use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Debt, DebtDirection, DebtOverview, LedgerError, Money, ResultLedger, debts, operations,
};

use super::{Ledger, normalize_optional_text, normalize_required_name, with_tx};

impl Ledger {
    pub async fn create_debt(
        &self,
        workspace_id: Uuid,
        direction: DebtDirection,
        title: &str,
        counterparty: &str,
        initial_minor: i64,
        opened_on: NaiveDate,
        due_on: Option<NaiveDate>,
        notes: Option<&str>,
    ) -> ResultLedger<Debt> {
        let title = normalize_required_name(title, "debt")?;
        let counterparty = normalize_required_name(counterparty, "counterparty")?;
        let mut debt = Debt::new(
            workspace_id,
            direction,
            title,
            counterparty,
            initial_minor,
            opened_on,
        )?;
        debt.due_on = due_on;
        debt.notes = normalize_optional_text(notes);

        with_tx!(self, |db_tx| {
            self.require_workspace(&db_tx, workspace_id).await?;
            debts::ActiveModel::from(&debt).insert(&db_tx).await?;
            Ok(debt.clone())
        })
    }

    /// Lists debts with their derived remaining amount and progress.
    ///
    /// Paid-off debts stay listed until archived explicitly; archived ones
    /// are skipped unless `include_archived`.
    pub async fn list_debts(
        &self,
        workspace_id: Uuid,
        include_archived: bool,
    ) -> ResultLedger<Vec<DebtOverview>> {
        let mut query = debts::Entity::find()
            .filter(debts::Column::WorkspaceId.eq(workspace_id))
            .order_by_asc(debts::Column::OpenedOn);
        if !include_archived {
            query = query.filter(debts::Column::Archived.eq(false));
        }
        let models = query.all(&self.database).await?;

        // One scan over debt-linked operations covers every debt.
        let linked = operations::Entity::find()
            .filter(operations::Column::WorkspaceId.eq(workspace_id))
            .filter(operations::Column::DebtId.is_not_null())
            .all(&self.database)
            .await?;
        let mut applied_by_debt: HashMap<Uuid, i64> = HashMap::new();
        for model in linked {
            if let (Some(debt_id), Some(applied)) = (model.debt_id, model.debt_applied_minor) {
                *applied_by_debt.entry(debt_id).or_insert(0) += applied;
            }
        }

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let debt = Debt::try_from(model)?;
            let applied = applied_by_debt.get(&debt.id).copied().unwrap_or(0);
            out.push(DebtOverview::derive(debt, applied));
        }
        Ok(out)
    }

    pub async fn debt_overview(
        &self,
        workspace_id: Uuid,
        debt_id: Uuid,
    ) -> ResultLedger<DebtOverview> {
        let debt = self.require_debt(&self.database, workspace_id, debt_id).await?;
        let applied = applied_sum(&self.database, workspace_id, debt_id, None).await?;
        Ok(DebtOverview::derive(debt, applied))
    }

    /// Raw derived remaining amount (may be negative if the store was
    /// corrupted out-of-band); the same value backs the write-time guard.
    pub async fn debt_remaining(&self, workspace_id: Uuid, debt_id: Uuid) -> ResultLedger<Money> {
        let debt = self.require_debt(&self.database, workspace_id, debt_id).await?;
        let applied = applied_sum(&self.database, workspace_id, debt_id, None).await?;
        Ok(Money::new(debt.initial_minor - applied))
    }

    pub async fn archive_debt(
        &self,
        workspace_id: Uuid,
        debt_id: Uuid,
        archived: bool,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            self.require_debt(&db_tx, workspace_id, debt_id).await?;
            let active = debts::ActiveModel {
                id: ActiveValue::Set(debt_id),
                archived: ActiveValue::Set(archived),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Hard delete, rejected while any operation links to the debt; callers
    /// must unlink or delete those operations first.
    pub async fn delete_debt(&self, workspace_id: Uuid, debt_id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            self.require_debt(&db_tx, workspace_id, debt_id).await?;

            let references = operations::Entity::find()
                .filter(operations::Column::WorkspaceId.eq(workspace_id))
                .filter(operations::Column::DebtId.eq(debt_id))
                .count(&db_tx)
                .await?;
            if references > 0 {
                return Err(LedgerError::ReferentialIntegrity {
                    entity: "debt".to_string(),
                    references,
                });
            }

            debts::Entity::delete_by_id(debt_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    pub(crate) async fn require_debt<C: ConnectionTrait>(
        &self,
        db: &C,
        workspace_id: Uuid,
        debt_id: Uuid,
    ) -> ResultLedger<Debt> {
        let model = debts::Entity::find_by_id(debt_id)
            .filter(debts::Column::WorkspaceId.eq(workspace_id))
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("debt not exists".to_string()))?;
        Debt::try_from(model)
    }

    /// Write-time over-application guard, run inside the same transaction as
    /// the operation write.
    ///
    /// `exclude_operation` discounts an operation's own current contribution
    /// when it is being updated. The check reads the current remaining value
    /// and validates against it; two concurrent applications can both pass
    /// against the same pre-write value (accepted check-then-act gap, see
    /// DESIGN notes).
    pub(crate) async fn check_debt_headroom<C: ConnectionTrait>(
        &self,
        db_tx: &C,
        workspace_id: Uuid,
        debt_id: Uuid,
        requested_minor: i64,
        exclude_operation: Option<Uuid>,
    ) -> ResultLedger<Debt> {
        let debt = self.require_debt(db_tx, workspace_id, debt_id).await?;
        if debt.archived {
            return Err(LedgerError::Validation(format!(
                "debt '{}' is archived",
                debt.title
            )));
        }
        let applied = applied_sum(db_tx, workspace_id, debt_id, exclude_operation).await?;
        let remaining_minor = debt.initial_minor - applied;
        if requested_minor > remaining_minor {
            return Err(LedgerError::DebtOverapplication {
                requested_minor,
                remaining_minor,
            });
        }
        Ok(debt)
    }
}

async fn applied_sum<C: ConnectionTrait>(
    db: &C,
    workspace_id: Uuid,
    debt_id: Uuid,
    exclude_operation: Option<Uuid>,
) -> ResultLedger<i64> {
    let mut query = operations::Entity::find()
        .filter(operations::Column::WorkspaceId.eq(workspace_id))
        .filter(operations::Column::DebtId.eq(debt_id));
    if let Some(op_id) = exclude_operation {
        query = query.filter(operations::Column::Id.ne(op_id));
    }
    let models = query.all(db).await?;
    Ok(models
        .iter()
        .filter_map(|model| model.debt_applied_minor)
        .sum())
}
