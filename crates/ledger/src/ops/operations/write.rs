//! Record, update and delete for single operations.

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, TransactionTrait};
use uuid::Uuid;

use crate::{
    LedgerError, Operation, OperationKind, RecordOperationCmd, ResultLedger, UpdateOperationCmd,
    operation_tags, operations,
    ops::{Ledger, normalize_optional_text, with_tx},
};

use super::resolve_base_posting;

impl Ledger {
    /// Record an income/expense/salary operation.
    ///
    /// Validation, rate resolution, debt headroom check, tag upserts and the
    /// insert all run inside one database transaction.
    pub async fn record_operation(&self, cmd: RecordOperationCmd) -> ResultLedger<Operation> {
        if cmd.kind == OperationKind::Transfer {
            return Err(LedgerError::Validation(
                "transfers are recorded through record_transfer".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let workspace = self.require_workspace(&db_tx, cmd.workspace_id).await?;
            let currency = cmd.currency.unwrap_or(workspace.base_currency);

            let mut op = Operation::new(
                cmd.workspace_id,
                cmd.kind,
                cmd.amount_minor,
                currency,
                cmd.occurred_on,
                cmd.user_id.clone(),
            )?;
            op.note = normalize_optional_text(cmd.note.as_deref());

            if let Some(account_id) = cmd.account_id {
                self.require_active_account(&db_tx, cmd.workspace_id, account_id)
                    .await?;
                op.account_id = Some(account_id);
            }
            if let Some(category_id) = cmd.category_id {
                self.require_category_for_kind(&db_tx, cmd.workspace_id, category_id, cmd.kind)
                    .await?;
                op.category_id = Some(category_id);
            }

            if let Some(debt_id) = cmd.debt_id {
                let applied = cmd.debt_applied_minor.ok_or_else(|| {
                    LedgerError::Validation(
                        "debt_applied_minor is required when a debt is linked".to_string(),
                    )
                })?;
                check_debt_link(cmd.kind, applied, cmd.amount_minor)?;
                let debt = self
                    .check_debt_headroom(&db_tx, cmd.workspace_id, debt_id, applied, None)
                    .await?;
                if cmd.kind != debt.direction.settling_kind() {
                    return Err(LedgerError::Validation(format!(
                        "a {} debt is settled with {} operations",
                        debt.direction.as_str(),
                        debt.direction.settling_kind().as_str()
                    )));
                }
                op.debt_id = Some(debt_id);
                op.debt_applied_minor = Some(applied);
            } else if cmd.debt_applied_minor.is_some() {
                return Err(LedgerError::Validation(
                    "debt_applied_minor requires a linked debt".to_string(),
                ));
            }

            resolve_base_posting(
                &db_tx,
                &workspace,
                cmd.amount_minor,
                currency,
                cmd.exchange_rate,
                cmd.occurred_on,
            )
            .await?
            .apply(&mut op);

            operations::ActiveModel::from(&op).insert(&db_tx).await?;
            op.tag_ids = self
                .relink_tags(&db_tx, cmd.workspace_id, op.id, &cmd.tags)
                .await?;

            tracing::debug!(
                operation = %op.id,
                kind = op.kind.as_str(),
                amount_minor = op.amount_minor,
                "operation recorded"
            );
            Ok(op)
        })
    }

    /// Patch an existing income/expense/salary operation.
    ///
    /// `None` fields keep their current value. The base-currency posting is
    /// re-resolved whenever amount, currency, rate or date change; debt
    /// headroom is re-checked against the remaining balance excluding this
    /// operation's own current contribution.
    pub async fn update_operation(
        &self,
        workspace_id: Uuid,
        operation_id: Uuid,
        patch: UpdateOperationCmd,
    ) -> ResultLedger<Operation> {
        with_tx!(self, |db_tx| {
            let workspace = self.require_workspace(&db_tx, workspace_id).await?;
            let mut op = self
                .require_operation(&db_tx, workspace_id, operation_id)
                .await?;
            if op.kind == OperationKind::Transfer {
                return Err(LedgerError::Validation(
                    "transfer legs are updated through update_transfer".to_string(),
                ));
            }

            let reprice = patch.amount_minor.is_some()
                || patch.currency.is_some()
                || patch.exchange_rate.is_some()
                || patch.occurred_on.is_some();

            if let Some(amount) = patch.amount_minor {
                if amount <= 0 {
                    return Err(LedgerError::Validation(
                        "amount_minor must be > 0".to_string(),
                    ));
                }
                op.amount_minor = amount;
            }
            if let Some(currency) = patch.currency {
                op.currency = currency;
            }
            if let Some(date) = patch.occurred_on {
                op.occurred_on = date;
            }
            if let Some(account_id) = patch.account_id {
                self.require_active_account(&db_tx, workspace_id, account_id)
                    .await?;
                op.account_id = Some(account_id);
            }
            if let Some(category_id) = patch.category_id {
                self.require_category_for_kind(&db_tx, workspace_id, category_id, op.kind)
                    .await?;
                op.category_id = Some(category_id);
            }
            if let Some(note) = patch.note.as_deref() {
                op.note = normalize_optional_text(Some(note));
            }

            if let Some(applied) = patch.debt_applied_minor {
                let debt_id = op.debt_id.ok_or_else(|| {
                    LedgerError::Validation(
                        "debt_applied_minor requires a linked debt".to_string(),
                    )
                })?;
                check_debt_link(op.kind, applied, op.amount_minor)?;
                self.check_debt_headroom(&db_tx, workspace_id, debt_id, applied, Some(op.id))
                    .await?;
                op.debt_applied_minor = Some(applied);
            } else if patch.amount_minor.is_some() {
                // Amount may have shrunk under an unchanged application.
                if let Some(applied) = op.debt_applied_minor {
                    check_debt_link(op.kind, applied, op.amount_minor)?;
                }
            }

            if reprice {
                // An explicit rate in the patch wins; otherwise re-resolve,
                // even if the stored row carried a manual rate before.
                resolve_base_posting(
                    &db_tx,
                    &workspace,
                    op.amount_minor,
                    op.currency,
                    patch.exchange_rate,
                    op.occurred_on,
                )
                .await?
                .apply(&mut op);
            }

            operations::ActiveModel::from(&op).update(&db_tx).await?;
            op.tag_ids = match patch.tags {
                Some(names) => {
                    self.relink_tags(&db_tx, workspace_id, op.id, &names)
                        .await?
                }
                None => super::load_tag_ids(&db_tx, op.id).await?,
            };
            Ok(op)
        })
    }

    /// Delete an operation and its tag links.
    ///
    /// Deleting either leg of a transfer deletes every row of its group;
    /// the group is the unit of deletion, so an orphaned leg of a torn pair
    /// can still be cleaned up here even though reads report it as
    /// corruption. Deleting a debt-linked operation releases its applied
    /// amount implicitly, because remaining debt is derived on read.
    pub async fn delete_operation(
        &self,
        workspace_id: Uuid,
        operation_id: Uuid,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let op = self
                .require_operation(&db_tx, workspace_id, operation_id)
                .await?;

            let doomed: Vec<Uuid> = match op.transfer_group_id {
                Some(group_id) => operations::Entity::find()
                    .filter(operations::Column::WorkspaceId.eq(workspace_id))
                    .filter(operations::Column::TransferGroupId.eq(group_id))
                    .all(&db_tx)
                    .await?
                    .into_iter()
                    .map(|model| model.id)
                    .collect(),
                None => vec![op.id],
            };

            for id in &doomed {
                operation_tags::Entity::delete_many()
                    .filter(operation_tags::Column::OperationId.eq(*id))
                    .exec(&db_tx)
                    .await?;
                operations::Entity::delete_by_id(*id).exec(&db_tx).await?;
            }
            tracing::debug!(deleted = doomed.len(), "operation(s) deleted");
            Ok(())
        })
    }
}

fn check_debt_link(kind: OperationKind, applied_minor: i64, amount_minor: i64) -> ResultLedger<()> {
    if kind == OperationKind::Transfer {
        return Err(LedgerError::Validation(
            "transfers cannot settle a debt".to_string(),
        ));
    }
    if applied_minor <= 0 {
        return Err(LedgerError::Validation(
            "debt_applied_minor must be > 0".to_string(),
        ));
    }
    if applied_minor > amount_minor {
        return Err(LedgerError::Validation(
            "debt_applied_minor cannot exceed the operation amount".to_string(),
        ));
    }
    Ok(())
}
