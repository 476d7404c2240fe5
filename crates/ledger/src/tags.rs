//! Tag registry per workspace.
//!
//! Tags are free-form labels created on demand while recording operations
//! (`find_or_create` semantics); `name_norm` keeps them unique per workspace
//! regardless of casing or Unicode form.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub name_norm: String,
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
    #[sea_orm(has_many = "super::operation_tags::Entity")]
    OperationTags,
}

impl Related<super::workspaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspace.def()
    }
}

impl Related<super::operation_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OperationTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
