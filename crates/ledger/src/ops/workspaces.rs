use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use chrono::Utc;

use crate::{
    Currency, LedgerError, ResultLedger, Workspace, accounts, workspaces,
};

use super::{Ledger, normalize_required_name, with_tx};

impl Ledger {
    /// Creates a workspace and seeds its default "Cash" account so clients
    /// can start recording immediately.
    pub async fn create_workspace(
        &self,
        name: &str,
        base_currency: Currency,
        owner_id: &str,
    ) -> ResultLedger<Workspace> {
        let name = normalize_required_name(name, "workspace")?;
        let workspace = Workspace {
            id: Uuid::new_v4(),
            name,
            base_currency,
            owner_id: owner_id.to_string(),
            created_at: Utc::now(),
        };

        with_tx!(self, |db_tx| {
            workspaces::ActiveModel::from(&workspace)
                .insert(&db_tx)
                .await?;

            let mut cash = accounts::Account::new(workspace.id, "Cash".to_string(), None);
            cash.is_default = true;
            accounts::ActiveModel::from(&cash).insert(&db_tx).await?;

            tracing::debug!(workspace_id = %workspace.id, "workspace created");
            Ok(workspace.clone())
        })
    }

    /// Returns a workspace by id.
    pub async fn workspace(&self, workspace_id: Uuid) -> ResultLedger<Workspace> {
        let model = workspaces::Entity::find_by_id(workspace_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("workspace not exists".to_string()))?;
        Workspace::try_from(model)
    }

    /// Lists workspaces owned by a user.
    pub async fn workspaces_for(&self, owner_id: &str) -> ResultLedger<Vec<Workspace>> {
        let models = workspaces::Entity::find()
            .filter(workspaces::Column::OwnerId.eq(owner_id))
            .all(&self.database)
            .await?;
        models.into_iter().map(Workspace::try_from).collect()
    }

    /// Loads a workspace inside a transaction; used by every scoped write.
    pub(crate) async fn require_workspace<C: ConnectionTrait>(
        &self,
        db_tx: &C,
        workspace_id: Uuid,
    ) -> ResultLedger<Workspace> {
        let model = workspaces::Entity::find_by_id(workspace_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("workspace not exists".to_string()))?;
        Workspace::try_from(model)
    }

    /// Renames a workspace.
    pub async fn rename_workspace(&self, workspace_id: Uuid, name: &str) -> ResultLedger<()> {
        let name = normalize_required_name(name, "workspace")?;
        with_tx!(self, |db_tx| {
            self.require_workspace(&db_tx, workspace_id).await?;
            let active = workspaces::ActiveModel {
                id: ActiveValue::Set(workspace_id),
                name: ActiveValue::Set(name),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }
}
