use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    CategoryKind, LedgerError, OperationKind, ResultLedger, categories, operation_tags,
    operations, tags,
};

use super::{Ledger, normalize_name_key, normalize_required_name, with_tx};

impl Ledger {
    /// Creates a category. `name_norm` keeps names unique per workspace
    /// regardless of casing or Unicode form.
    pub async fn create_category(
        &self,
        workspace_id: Uuid,
        name: &str,
        kind: CategoryKind,
    ) -> ResultLedger<categories::Model> {
        let name = normalize_required_name(name, "category")?;
        let name_norm = normalize_name_key(&name);
        with_tx!(self, |db_tx| {
            self.require_workspace(&db_tx, workspace_id).await?;

            let existing = categories::Entity::find()
                .filter(categories::Column::WorkspaceId.eq(workspace_id))
                .filter(categories::Column::NameNorm.eq(name_norm.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(LedgerError::ExistingKey(name));
            }

            let model = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                workspace_id: ActiveValue::Set(workspace_id),
                name: ActiveValue::Set(name),
                name_norm: ActiveValue::Set(name_norm),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                archived: ActiveValue::Set(false),
            }
            .insert(&db_tx)
            .await?;
            Ok(model)
        })
    }

    pub async fn list_categories(
        &self,
        workspace_id: Uuid,
    ) -> ResultLedger<Vec<categories::Model>> {
        Ok(categories::Entity::find()
            .filter(categories::Column::WorkspaceId.eq(workspace_id))
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?)
    }

    pub async fn archive_category(
        &self,
        workspace_id: Uuid,
        category_id: Uuid,
        archived: bool,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, workspace_id, category_id).await?;
            let active = categories::ActiveModel {
                id: ActiveValue::Set(category_id),
                archived: ActiveValue::Set(archived),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Hard delete, rejected while any operation references the category.
    pub async fn delete_category(
        &self,
        workspace_id: Uuid,
        category_id: Uuid,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, workspace_id, category_id).await?;

            let references = operations::Entity::find()
                .filter(operations::Column::WorkspaceId.eq(workspace_id))
                .filter(operations::Column::CategoryId.eq(category_id))
                .count(&db_tx)
                .await?;
            if references > 0 {
                return Err(LedgerError::ReferentialIntegrity {
                    entity: "category".to_string(),
                    references,
                });
            }

            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    pub(crate) async fn require_category<C: ConnectionTrait>(
        &self,
        db_tx: &C,
        workspace_id: Uuid,
        category_id: Uuid,
    ) -> ResultLedger<categories::Model> {
        categories::Entity::find_by_id(category_id)
            .filter(categories::Column::WorkspaceId.eq(workspace_id))
            .one(db_tx)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("category not exists".to_string()))
    }

    /// Validates that a category may label an operation of `kind`: income
    /// categories for incomes, expense categories for expenses and salaries.
    pub(crate) async fn require_category_for_kind<C: ConnectionTrait>(
        &self,
        db_tx: &C,
        workspace_id: Uuid,
        category_id: Uuid,
        kind: OperationKind,
    ) -> ResultLedger<categories::Model> {
        let model = self.require_category(db_tx, workspace_id, category_id).await?;
        if model.archived {
            return Err(LedgerError::Validation(format!(
                "category '{}' is archived",
                model.name
            )));
        }
        let category_kind = CategoryKind::try_from(model.kind.as_str())?;
        let expected = match kind {
            OperationKind::Income => CategoryKind::Income,
            OperationKind::Expense | OperationKind::Salary => CategoryKind::Expense,
            OperationKind::Transfer => {
                return Err(LedgerError::Validation(
                    "transfers cannot carry a category".to_string(),
                ));
            }
        };
        if category_kind != expected {
            return Err(LedgerError::Validation(format!(
                "category '{}' is a {} category and cannot label a {} operation",
                model.name,
                category_kind.as_str(),
                kind.as_str()
            )));
        }
        Ok(model)
    }

    pub async fn list_tags(&self, workspace_id: Uuid) -> ResultLedger<Vec<tags::Model>> {
        Ok(tags::Entity::find()
            .filter(tags::Column::WorkspaceId.eq(workspace_id))
            .order_by_asc(tags::Column::Name)
            .all(&self.database)
            .await?)
    }

    /// Hard delete, rejected while any operation still carries the tag.
    pub async fn delete_tag(&self, workspace_id: Uuid, tag_id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = tags::Entity::find_by_id(tag_id)
                .filter(tags::Column::WorkspaceId.eq(workspace_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| LedgerError::KeyNotFound("tag not exists".to_string()))?;

            let references = operation_tags::Entity::find()
                .filter(operation_tags::Column::TagId.eq(model.id))
                .count(&db_tx)
                .await?;
            if references > 0 {
                return Err(LedgerError::ReferentialIntegrity {
                    entity: "tag".to_string(),
                    references,
                });
            }

            tags::Entity::delete_by_id(tag_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Finds a tag by normalized name or creates it; the single entry point
    /// for tag upserts so writes never scatter ad hoc inserts.
    pub(crate) async fn find_or_create_tag<C: ConnectionTrait>(
        &self,
        db_tx: &C,
        workspace_id: Uuid,
        name: &str,
    ) -> ResultLedger<tags::Model> {
        let name = normalize_required_name(name, "tag")?;
        let name_norm = normalize_name_key(&name);

        if let Some(model) = tags::Entity::find()
            .filter(tags::Column::WorkspaceId.eq(workspace_id))
            .filter(tags::Column::NameNorm.eq(name_norm.clone()))
            .one(db_tx)
            .await?
        {
            return Ok(model);
        }

        let model = tags::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            workspace_id: ActiveValue::Set(workspace_id),
            name: ActiveValue::Set(name),
            name_norm: ActiveValue::Set(name_norm),
        }
        .insert(db_tx)
        .await?;
        Ok(model)
    }
}
