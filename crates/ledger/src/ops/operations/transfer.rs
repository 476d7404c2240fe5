//! Transfer pairs: two operation rows sharing a `transfer_group_id`.
//!
//! The out leg books against the source account in the source currency, the
//! in leg against the destination account in the destination currency. Both
//! rows are written in one database transaction; each leg normalizes to the
//! workspace base with its own rate, so cross-currency pairs may book
//! different base values per leg.

use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ConnectionTrait, TransactionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, LedgerError, Money, Operation, OperationKind, RecordTransferCmd, ResultLedger,
    TransferDirection, UpdateTransferCmd, Workspace, operations,
    ops::{Ledger, normalize_optional_text, rates::resolve_rate_on, with_tx},
};

use super::{resolve_base_posting, validate_rate};

/// The two legs of a transfer, as written or loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferPair {
    pub outgoing: Operation,
    pub incoming: Operation,
}

impl TransferPair {
    #[must_use]
    pub fn group_id(&self) -> Uuid {
        // Both legs carry the same group id by construction.
        self.outgoing.transfer_group_id.unwrap_or_default()
    }
}

impl Ledger {
    /// Record a transfer between two accounts of the same workspace.
    pub async fn record_transfer(&self, cmd: RecordTransferCmd) -> ResultLedger<TransferPair> {
        if cmd.from_account_id == cmd.to_account_id {
            return Err(LedgerError::Validation(
                "transfer source and destination accounts must differ".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let workspace = self.require_workspace(&db_tx, cmd.workspace_id).await?;
            self.require_active_account(&db_tx, cmd.workspace_id, cmd.from_account_id)
                .await?;
            self.require_active_account(&db_tx, cmd.workspace_id, cmd.to_account_id)
                .await?;

            let from_currency = cmd.currency.unwrap_or(workspace.base_currency);
            let to_currency = cmd.to_currency.unwrap_or(from_currency);
            let group_id = Uuid::new_v4();
            let note = normalize_optional_text(cmd.note.as_deref());

            let in_amount_minor = destination_amount(
                &db_tx,
                &workspace,
                cmd.amount_minor,
                from_currency,
                to_currency,
                cmd.cross_rate,
                cmd.occurred_on,
            )
            .await?;

            let mut outgoing = Operation::new(
                cmd.workspace_id,
                OperationKind::Transfer,
                cmd.amount_minor,
                from_currency,
                cmd.occurred_on,
                cmd.user_id.clone(),
            )?;
            outgoing.account_id = Some(cmd.from_account_id);
            outgoing.transfer_direction = Some(TransferDirection::Out);
            outgoing.transfer_group_id = Some(group_id);
            outgoing.note = note.clone();
            resolve_base_posting(
                &db_tx,
                &workspace,
                outgoing.amount_minor,
                from_currency,
                None,
                cmd.occurred_on,
            )
            .await?
            .apply(&mut outgoing);

            let mut incoming = Operation::new(
                cmd.workspace_id,
                OperationKind::Transfer,
                in_amount_minor,
                to_currency,
                cmd.occurred_on,
                cmd.user_id,
            )?;
            incoming.account_id = Some(cmd.to_account_id);
            incoming.transfer_direction = Some(TransferDirection::In);
            incoming.transfer_group_id = Some(group_id);
            incoming.note = note;
            resolve_base_posting(
                &db_tx,
                &workspace,
                incoming.amount_minor,
                to_currency,
                None,
                cmd.occurred_on,
            )
            .await?
            .apply(&mut incoming);

            operations::ActiveModel::from(&outgoing).insert(&db_tx).await?;
            operations::ActiveModel::from(&incoming).insert(&db_tx).await?;

            tracing::debug!(
                group = %group_id,
                from = %cmd.from_account_id,
                to = %cmd.to_account_id,
                amount_minor = cmd.amount_minor,
                "transfer recorded"
            );
            Ok(TransferPair { outgoing, incoming })
        })
    }

    /// Patch a transfer pair; both legs always change together.
    pub async fn update_transfer(
        &self,
        workspace_id: Uuid,
        group_id: Uuid,
        patch: UpdateTransferCmd,
    ) -> ResultLedger<TransferPair> {
        with_tx!(self, |db_tx| {
            let workspace = self.require_workspace(&db_tx, workspace_id).await?;
            let TransferPair {
                mut outgoing,
                mut incoming,
            } = self
                .require_transfer_pair(&db_tx, workspace_id, group_id)
                .await?;

            if let Some(from_account_id) = patch.from_account_id {
                self.require_active_account(&db_tx, workspace_id, from_account_id)
                    .await?;
                outgoing.account_id = Some(from_account_id);
            }
            if let Some(to_account_id) = patch.to_account_id {
                self.require_active_account(&db_tx, workspace_id, to_account_id)
                    .await?;
                incoming.account_id = Some(to_account_id);
            }
            if outgoing.account_id == incoming.account_id {
                return Err(LedgerError::Validation(
                    "transfer source and destination accounts must differ".to_string(),
                ));
            }

            if let Some(amount) = patch.amount_minor {
                if amount <= 0 {
                    return Err(LedgerError::Validation(
                        "amount_minor must be > 0".to_string(),
                    ));
                }
                outgoing.amount_minor = amount;
            }
            if let Some(currency) = patch.currency {
                outgoing.currency = currency;
            }
            if let Some(to_currency) = patch.to_currency {
                incoming.currency = to_currency;
            }
            if let Some(date) = patch.occurred_on {
                outgoing.occurred_on = date;
                incoming.occurred_on = date;
            }
            if let Some(note) = patch.note.as_deref() {
                let note = normalize_optional_text(Some(note));
                outgoing.note = note.clone();
                incoming.note = note;
            }

            // Recompute the in-leg amount and both base postings from the
            // updated state; same-currency pairs keep the legs equal.
            incoming.amount_minor = destination_amount(
                &db_tx,
                &workspace,
                outgoing.amount_minor,
                outgoing.currency,
                incoming.currency,
                patch.cross_rate,
                outgoing.occurred_on,
            )
            .await?;
            resolve_base_posting(
                &db_tx,
                &workspace,
                outgoing.amount_minor,
                outgoing.currency,
                None,
                outgoing.occurred_on,
            )
            .await?
            .apply(&mut outgoing);
            resolve_base_posting(
                &db_tx,
                &workspace,
                incoming.amount_minor,
                incoming.currency,
                None,
                incoming.occurred_on,
            )
            .await?
            .apply(&mut incoming);

            operations::ActiveModel::from(&outgoing).update(&db_tx).await?;
            operations::ActiveModel::from(&incoming).update(&db_tx).await?;
            Ok(TransferPair { outgoing, incoming })
        })
    }

    /// Load a transfer pair by group id.
    pub async fn transfer(&self, workspace_id: Uuid, group_id: Uuid) -> ResultLedger<TransferPair> {
        self.require_transfer_pair(&self.database, workspace_id, group_id)
            .await
    }
}

/// Amount booked on the in leg, in the destination currency.
///
/// Same currency keeps the amount as-is; cross-currency uses the explicit
/// cross rate when supplied, otherwise the resolver between the two leg
/// currencies (never via the base).
async fn destination_amount<C: ConnectionTrait>(
    db: &C,
    workspace: &Workspace,
    amount_minor: i64,
    from_currency: Currency,
    to_currency: Currency,
    cross_rate: Option<f64>,
    date: NaiveDate,
) -> ResultLedger<i64> {
    if from_currency == to_currency {
        if cross_rate.is_some() {
            return Err(LedgerError::Validation(
                "cross_rate is only accepted when the leg currencies differ".to_string(),
            ));
        }
        return Ok(amount_minor);
    }
    let rate = match cross_rate {
        Some(rate) => {
            validate_rate(rate)?;
            rate
        }
        None => resolve_rate_on(db, workspace.id, from_currency, to_currency, date)
            .await?
            .ok_or_else(|| LedgerError::RateUnresolved {
                from: from_currency.code().to_string(),
                to: to_currency.code().to_string(),
            })?
            .rate,
    };
    Ok(Money::new(amount_minor).convert(rate).minor())
}
