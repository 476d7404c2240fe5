//! Accounts: named money pools inside a workspace.
//!
//! An account's balance is never stored; it is derived on read from the
//! operations that reference the account (see `ops::balances`). Archiving is
//! a soft-disable that hides the account from pickers while preserving
//! history; hard delete is rejected while any operation references it.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub is_default: bool,
    pub archived: bool,
}

impl Account {
    pub fn new(workspace_id: Uuid, name: String, color: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            name,
            color,
            is_default: false,
            archived: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub is_default: bool,
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

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::Set(account.id),
            workspace_id: ActiveValue::Set(account.workspace_id),
            name: ActiveValue::Set(account.name.clone()),
            color: ActiveValue::Set(account.color.clone()),
            is_default: ActiveValue::Set(account.is_default),
            archived: ActiveValue::Set(account.archived),
        }
    }
}

impl From<Model> for Account {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            workspace_id: model.workspace_id,
            name: model.name,
            color: model.color,
            is_default: model.is_default,
            archived: model.archived,
        }
    }
}
