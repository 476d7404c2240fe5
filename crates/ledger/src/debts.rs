//! Debts: money the user owes or is owed.
//!
//! A debt's remaining balance is never stored. It is derived on read as
//! `initial_minor − Σ debt_applied_minor` over the operations linked to the
//! debt, and the same derivation backs the write-time over-application guard
//! (see `ops::debts`).

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, Money, OperationKind, ResultLedger};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtDirection {
    IOwe,
    OwedToMe,
}

impl DebtDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IOwe => "i_owe",
            Self::OwedToMe => "owed_to_me",
        }
    }

    /// Operation kind that settles a debt of this direction: debts I owe are
    /// repaid with expenses, debts owed to me are settled with incomes.
    #[must_use]
    pub fn settling_kind(self) -> OperationKind {
        match self {
            Self::IOwe => OperationKind::Expense,
            Self::OwedToMe => OperationKind::Income,
        }
    }
}

impl TryFrom<&str> for DebtDirection {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "i_owe" => Ok(Self::IOwe),
            "owed_to_me" => Ok(Self::OwedToMe),
            other => Err(LedgerError::Validation(format!(
                "invalid debt direction: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub direction: DebtDirection,
    pub title: String,
    pub counterparty: String,
    pub initial_minor: i64,
    pub opened_on: NaiveDate,
    pub due_on: Option<NaiveDate>,
    pub notes: Option<String>,
    pub archived: bool,
}

impl Debt {
    pub fn new(
        workspace_id: Uuid,
        direction: DebtDirection,
        title: String,
        counterparty: String,
        initial_minor: i64,
        opened_on: NaiveDate,
    ) -> ResultLedger<Self> {
        if initial_minor <= 0 {
            return Err(LedgerError::Validation(
                "initial_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            workspace_id,
            direction,
            title,
            counterparty,
            initial_minor,
            opened_on,
            due_on: None,
            notes: None,
            archived: false,
        })
    }
}

/// A debt together with its derived amounts, as returned by list/detail
/// reads. `remaining` is clamped at zero for display; the raw value backs
/// the write-time guard and is not exposed here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtOverview {
    pub debt: Debt,
    pub remaining: Money,
    pub progress_pct: u8,
}

impl DebtOverview {
    pub(crate) fn derive(debt: Debt, applied_minor: i64) -> Self {
        let remaining = Money::new(debt.initial_minor - applied_minor).clamp_display();
        let applied = debt.initial_minor - remaining.minor();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let progress_pct =
            ((100.0 * applied as f64 / debt.initial_minor as f64).round() as i64).clamp(0, 100)
                as u8;
        Self {
            debt,
            remaining,
            progress_pct,
        }
    }

    /// A debt is paid off when nothing remains; it stays listed until the
    /// user archives it explicitly.
    #[must_use]
    pub fn is_paid_off(&self) -> bool {
        self.remaining.is_zero()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub direction: String,
    pub title: String,
    pub counterparty: String,
    pub initial_minor: i64,
    pub opened_on: Date,
    pub due_on: Option<Date>,
    pub notes: Option<String>,
    pub archived: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workspaces::Entity",
        from = "Column::WorkspaceId",
        to = "super::workspaces::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Workspace,
    #[sea_orm(has_many = "super::operations::Entity")]
    Operations,
}

impl Related<super::workspaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspace.def()
    }
}

impl Related<super::operations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Operations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Debt> for ActiveModel {
    fn from(debt: &Debt) -> Self {
        Self {
            id: ActiveValue::Set(debt.id),
            workspace_id: ActiveValue::Set(debt.workspace_id),
            direction: ActiveValue::Set(debt.direction.as_str().to_string()),
            title: ActiveValue::Set(debt.title.clone()),
            counterparty: ActiveValue::Set(debt.counterparty.clone()),
            initial_minor: ActiveValue::Set(debt.initial_minor),
            opened_on: ActiveValue::Set(debt.opened_on),
            due_on: ActiveValue::Set(debt.due_on),
            notes: ActiveValue::Set(debt.notes.clone()),
            archived: ActiveValue::Set(debt.archived),
        }
    }
}

impl TryFrom<Model> for Debt {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            workspace_id: model.workspace_id,
            direction: DebtDirection::try_from(model.direction.as_str())?,
            title: model.title,
            counterparty: model.counterparty,
            initial_minor: model.initial_minor,
            opened_on: model.opened_on,
            due_on: model.due_on,
            notes: model.notes,
            archived: model.archived,
        })
    }
}
