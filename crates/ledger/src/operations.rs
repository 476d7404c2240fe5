//! Operation primitives.
//!
//! An `Operation` is the atomic ledger entry: one signed effect against at
//! most one account, optionally categorized, tagged and linked to a debt.
//! Transfers are a *pair* of operations sharing a `transfer_group_id`, one
//! `out` row against the source account and one `in` row against the
//! destination (see `ops::operations::transfer`).
//!
//! Amounts are stored as positive integer **minor units** in the operation's
//! own currency; `base_amount_minor` carries the workspace-base-currency
//! value when the currencies differ (`None` means same currency, rate 1).

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, LedgerError, Money, ResultLedger};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Income,
    Expense,
    Salary,
    Transfer,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Salary => "salary",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for OperationKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "salary" => Ok(Self::Salary),
            "transfer" => Ok(Self::Transfer),
            other => Err(LedgerError::Validation(format!(
                "invalid operation kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    In,
    Out,
}

impl TransferDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl TryFrom<&str> for TransferDirection {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            other => Err(LedgerError::Validation(format!(
                "invalid transfer direction: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub kind: OperationKind,
    pub amount_minor: i64,
    pub currency: Currency,
    pub exchange_rate: Option<f64>,
    pub base_amount_minor: Option<i64>,
    pub account_id: Option<Uuid>,
    pub transfer_direction: Option<TransferDirection>,
    pub transfer_group_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub debt_id: Option<Uuid>,
    pub debt_applied_minor: Option<i64>,
    pub note: Option<String>,
    pub occurred_on: NaiveDate,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    /// Tag ids linked to this operation (loaded on detail reads).
    pub tag_ids: Vec<Uuid>,
}

impl Operation {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        workspace_id: Uuid,
        kind: OperationKind,
        amount_minor: i64,
        currency: Currency,
        occurred_on: NaiveDate,
        created_by: String,
    ) -> ResultLedger<Self> {
        if amount_minor <= 0 {
            return Err(LedgerError::Validation(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            workspace_id,
            kind,
            amount_minor,
            currency,
            exchange_rate: None,
            base_amount_minor: None,
            account_id: None,
            transfer_direction: None,
            transfer_group_id: None,
            category_id: None,
            debt_id: None,
            debt_applied_minor: None,
            note: None,
            occurred_on,
            created_by,
            created_at: Utc::now(),
            tag_ids: Vec::new(),
        })
    }

    /// Base-currency value of this operation (rate 1 when currencies match).
    #[must_use]
    pub fn base_amount(&self) -> Money {
        Money::new(self.base_amount_minor.unwrap_or(self.amount_minor))
    }

    /// Signed base-currency effect on this operation's account.
    ///
    /// Income adds, expense and salary subtract, transfer legs follow their
    /// direction. Each transfer leg uses its own base amount; cross-currency
    /// pairs may book different base values per leg and that is allowed.
    #[must_use]
    pub fn signed_base_effect(&self) -> Money {
        let base = self.base_amount();
        match self.kind {
            OperationKind::Income => base,
            OperationKind::Expense | OperationKind::Salary => -base,
            OperationKind::Transfer => match self.transfer_direction {
                Some(TransferDirection::In) => base,
                Some(TransferDirection::Out) => -base,
                // A transfer row without a direction never passes validation.
                None => Money::ZERO,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "operations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub kind: String,
    pub amount_minor: i64,
    pub currency: String,
    pub exchange_rate: Option<f64>,
    pub base_amount_minor: Option<i64>,
    pub account_id: Option<Uuid>,
    pub transfer_direction: Option<String>,
    pub transfer_group_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub debt_id: Option<Uuid>,
    pub debt_applied_minor: Option<i64>,
    pub note: Option<String>,
    pub occurred_on: Date,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workspaces::Entity",
        from = "Column::WorkspaceId",
        to = "super::workspaces::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Workspace,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Account,
    #[sea_orm(
        belongs_to = "super::debts::Entity",
        from = "Column::DebtId",
        to = "super::debts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Debt,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
    #[sea_orm(has_many = "super::operation_tags::Entity")]
    OperationTags,
}

impl Related<super::workspaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspace.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debt.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::operation_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OperationTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Operation> for ActiveModel {
    fn from(op: &Operation) -> Self {
        Self {
            id: ActiveValue::Set(op.id),
            workspace_id: ActiveValue::Set(op.workspace_id),
            kind: ActiveValue::Set(op.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(op.amount_minor),
            currency: ActiveValue::Set(op.currency.code().to_string()),
            exchange_rate: ActiveValue::Set(op.exchange_rate),
            base_amount_minor: ActiveValue::Set(op.base_amount_minor),
            account_id: ActiveValue::Set(op.account_id),
            transfer_direction: ActiveValue::Set(
                op.transfer_direction.map(|d| d.as_str().to_string()),
            ),
            transfer_group_id: ActiveValue::Set(op.transfer_group_id),
            category_id: ActiveValue::Set(op.category_id),
            debt_id: ActiveValue::Set(op.debt_id),
            debt_applied_minor: ActiveValue::Set(op.debt_applied_minor),
            note: ActiveValue::Set(op.note.clone()),
            occurred_on: ActiveValue::Set(op.occurred_on),
            created_by: ActiveValue::Set(op.created_by.clone()),
            created_at: ActiveValue::Set(op.created_at),
        }
    }
}

impl TryFrom<Model> for Operation {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            workspace_id: model.workspace_id,
            kind: OperationKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            currency: Currency::try_from(model.currency.as_str())?,
            exchange_rate: model.exchange_rate,
            base_amount_minor: model.base_amount_minor,
            account_id: model.account_id,
            transfer_direction: model
                .transfer_direction
                .as_deref()
                .map(TransferDirection::try_from)
                .transpose()?,
            transfer_group_id: model.transfer_group_id,
            category_id: model.category_id,
            debt_id: model.debt_id,
            debt_applied_minor: model.debt_applied_minor,
            note: model.note,
            occurred_on: model.occurred_on,
            created_by: model.created_by,
            created_at: model.created_at,
            tag_ids: Vec::new(),
        })
    }
}
