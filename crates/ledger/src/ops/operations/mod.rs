//! Operation reads/writes: single entries, transfer pairs, listing.
//!
//! Every write validates inside the same database transaction that performs
//! the insert or update, so a failed validation never leaves a partial row
//! behind. Base-currency amounts are fixed at write time with the rate in
//! effect on `occurred_on`; later rate uploads never rewrite history.

mod list;
mod transfer;
mod write;

use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    Currency, LedgerError, Money, Operation, ResultLedger, TransferDirection, Workspace,
    operation_tags, operations, ops::rates::resolve_rate_on,
};

use super::Ledger;

pub use transfer::TransferPair;

/// Base-currency posting derived at write time. Both fields are `None` when
/// the operation currency is already the workspace base (implied rate 1).
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BasePosting {
    pub exchange_rate: Option<f64>,
    pub base_amount_minor: Option<i64>,
}

impl BasePosting {
    pub(crate) fn apply(self, op: &mut Operation) {
        op.exchange_rate = self.exchange_rate;
        op.base_amount_minor = self.base_amount_minor;
    }
}

/// Resolve the base-currency posting for an amount in `currency`.
///
/// An explicit caller-supplied rate wins over the resolver; without one the
/// resolver must find a rate or the write is rejected with `RateUnresolved`.
pub(crate) async fn resolve_base_posting<C: ConnectionTrait>(
    db: &C,
    workspace: &Workspace,
    amount_minor: i64,
    currency: Currency,
    explicit_rate: Option<f64>,
    date: NaiveDate,
) -> ResultLedger<BasePosting> {
    if currency == workspace.base_currency {
        if explicit_rate.is_some() {
            return Err(LedgerError::Validation(
                "exchange_rate is only accepted when the currency differs from the workspace base"
                    .to_string(),
            ));
        }
        return Ok(BasePosting::default());
    }

    let rate = match explicit_rate {
        Some(rate) => {
            validate_rate(rate)?;
            rate
        }
        None => {
            let resolved = resolve_rate_on(db, workspace.id, currency, workspace.base_currency, date)
                .await?
                .ok_or_else(|| LedgerError::RateUnresolved {
                    from: currency.code().to_string(),
                    to: workspace.base_currency.code().to_string(),
                })?;
            if !resolved.exact || resolved.inverted {
                tracing::debug!(
                    from = currency.code(),
                    to = workspace.base_currency.code(),
                    rate_date = %resolved.rate_date,
                    inverted = resolved.inverted,
                    "approximate exchange rate used"
                );
            }
            resolved.rate
        }
    };

    Ok(BasePosting {
        exchange_rate: Some(rate),
        base_amount_minor: Some(Money::new(amount_minor).convert(rate).minor()),
    })
}

pub(crate) fn validate_rate(rate: f64) -> ResultLedger<()> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(LedgerError::Validation(
            "exchange rate must be finite and > 0".to_string(),
        ));
    }
    Ok(())
}

impl Ledger {
    /// Single-operation detail read, with tag links loaded.
    pub async fn operation(&self, workspace_id: Uuid, operation_id: Uuid) -> ResultLedger<Operation> {
        let mut op = self
            .require_operation(&self.database, workspace_id, operation_id)
            .await?;
        op.tag_ids = load_tag_ids(&self.database, op.id).await?;
        Ok(op)
    }

    pub(crate) async fn require_operation<C: ConnectionTrait>(
        &self,
        db: &C,
        workspace_id: Uuid,
        operation_id: Uuid,
    ) -> ResultLedger<Operation> {
        let model = operations::Entity::find_by_id(operation_id)
            .filter(operations::Column::WorkspaceId.eq(workspace_id))
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("operation not exists".to_string()))?;
        Operation::try_from(model)
    }

    /// Load a transfer group and verify its shape: exactly one `in` and one
    /// `out` row. Anything else is a torn pair and is reported, never
    /// repaired.
    pub(crate) async fn require_transfer_pair<C: ConnectionTrait>(
        &self,
        db: &C,
        workspace_id: Uuid,
        group_id: Uuid,
    ) -> ResultLedger<TransferPair> {
        let models = operations::Entity::find()
            .filter(operations::Column::WorkspaceId.eq(workspace_id))
            .filter(operations::Column::TransferGroupId.eq(group_id))
            .all(db)
            .await?;
        if models.is_empty() {
            return Err(LedgerError::KeyNotFound("transfer not exists".to_string()));
        }

        let mut outgoing = None;
        let mut incoming = None;
        let row_count = models.len();
        for model in models {
            let op = Operation::try_from(model)?;
            match op.transfer_direction {
                Some(TransferDirection::Out) if outgoing.is_none() => outgoing = Some(op),
                Some(TransferDirection::In) if incoming.is_none() => incoming = Some(op),
                _ => {
                    return Err(LedgerError::PartialWrite(format!(
                        "transfer group {group_id} is malformed ({row_count} rows)"
                    )));
                }
            }
        }
        match (outgoing, incoming) {
            (Some(outgoing), Some(incoming)) => Ok(TransferPair { outgoing, incoming }),
            _ => Err(LedgerError::PartialWrite(format!(
                "transfer group {group_id} has {row_count} of 2 rows"
            ))),
        }
    }

    /// Replace the operation's tag links with the given (normalized,
    /// upserted) tag names, inside the caller's transaction.
    pub(crate) async fn relink_tags<C: ConnectionTrait>(
        &self,
        db_tx: &C,
        workspace_id: Uuid,
        operation_id: Uuid,
        tag_names: &[String],
    ) -> ResultLedger<Vec<Uuid>> {
        operation_tags::Entity::delete_many()
            .filter(operation_tags::Column::OperationId.eq(operation_id))
            .exec(db_tx)
            .await?;

        let mut tag_ids = Vec::with_capacity(tag_names.len());
        for name in tag_names {
            let tag = self.find_or_create_tag(db_tx, workspace_id, name).await?;
            if tag_ids.contains(&tag.id) {
                continue;
            }
            operation_tags::ActiveModel::link(operation_id, tag.id)
                .insert(db_tx)
                .await?;
            tag_ids.push(tag.id);
        }
        Ok(tag_ids)
    }
}

pub(crate) async fn load_tag_ids<C: ConnectionTrait>(
    db: &C,
    operation_id: Uuid,
) -> ResultLedger<Vec<Uuid>> {
    let links = operation_tags::Entity::find()
        .filter(operation_tags::Column::OperationId.eq(operation_id))
        .all(db)
        .await?;
    Ok(links.into_iter().map(|link| link.tag_id).collect())
}
