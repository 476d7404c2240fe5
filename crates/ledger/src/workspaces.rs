//! Workspace registry.
//!
//! A workspace is the ownership boundary for every other entity: accounts,
//! operations, rates, debts, categories and tags are all scoped to one
//! workspace and every query filters on `workspace_id`. User identity and
//! membership are handled upstream; the ledger only records the owner id.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, LedgerError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub base_currency: Currency,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "workspaces")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub base_currency: String,
    pub owner_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
    #[sea_orm(has_many = "super::operations::Entity")]
    Operations,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::operations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Operations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Workspace> for ActiveModel {
    fn from(workspace: &Workspace) -> Self {
        Self {
            id: ActiveValue::Set(workspace.id),
            name: ActiveValue::Set(workspace.name.clone()),
            base_currency: ActiveValue::Set(workspace.base_currency.code().to_string()),
            owner_id: ActiveValue::Set(workspace.owner_id.clone()),
            created_at: ActiveValue::Set(workspace.created_at),
        }
    }
}

impl TryFrom<Model> for Workspace {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            base_currency: Currency::try_from(model.base_currency.as_str())?,
            owner_id: model.owner_id,
            created_at: model.created_at,
        })
    }
}
