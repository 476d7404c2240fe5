use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{Account, LedgerError, ResultLedger, accounts, operations};

use super::{Ledger, normalize_optional_text, normalize_required_name, with_tx};

impl Ledger {
    /// Creates an account in a workspace. Names are unique per workspace.
    pub async fn create_account(
        &self,
        workspace_id: Uuid,
        name: &str,
        color: Option<&str>,
    ) -> ResultLedger<Account> {
        let name = normalize_required_name(name, "account")?;
        with_tx!(self, |db_tx| {
            self.require_workspace(&db_tx, workspace_id).await?;

            let existing = accounts::Entity::find()
                .filter(accounts::Column::WorkspaceId.eq(workspace_id))
                .filter(accounts::Column::Name.eq(name.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(LedgerError::ExistingKey(name));
            }

            let account = Account::new(workspace_id, name, normalize_optional_text(color));
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;
            Ok(account)
        })
    }

    /// Lists a workspace's accounts; archived ones are included so history
    /// views can still resolve names.
    pub async fn list_accounts(&self, workspace_id: Uuid) -> ResultLedger<Vec<Account>> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::WorkspaceId.eq(workspace_id))
            .order_by_asc(accounts::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Account::from).collect())
    }

    pub async fn rename_account(
        &self,
        workspace_id: Uuid,
        account_id: Uuid,
        name: &str,
    ) -> ResultLedger<()> {
        let name = normalize_required_name(name, "account")?;
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, workspace_id, account_id).await?;

            let clash = accounts::Entity::find()
                .filter(accounts::Column::WorkspaceId.eq(workspace_id))
                .filter(accounts::Column::Name.eq(name.clone()))
                .filter(accounts::Column::Id.ne(account_id))
                .one(&db_tx)
                .await?;
            if clash.is_some() {
                return Err(LedgerError::ExistingKey(name));
            }

            let active = accounts::ActiveModel {
                id: ActiveValue::Set(account_id),
                name: ActiveValue::Set(name),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Marks an account as the workspace default, clearing the previous
    /// default in the same transaction (at most one default per workspace).
    pub async fn set_default_account(
        &self,
        workspace_id: Uuid,
        account_id: Uuid,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, workspace_id, account_id).await?;
            if account.archived {
                return Err(LedgerError::Validation(
                    "archived account cannot be the default".to_string(),
                ));
            }

            let current_defaults = accounts::Entity::find()
                .filter(accounts::Column::WorkspaceId.eq(workspace_id))
                .filter(accounts::Column::IsDefault.eq(true))
                .all(&db_tx)
                .await?;
            for model in current_defaults {
                if model.id == account_id {
                    continue;
                }
                let active = accounts::ActiveModel {
                    id: ActiveValue::Set(model.id),
                    is_default: ActiveValue::Set(false),
                    ..Default::default()
                };
                active.update(&db_tx).await?;
            }

            let active = accounts::ActiveModel {
                id: ActiveValue::Set(account_id),
                is_default: ActiveValue::Set(true),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Soft-disables an account: hidden from pickers, history preserved.
    pub async fn archive_account(
        &self,
        workspace_id: Uuid,
        account_id: Uuid,
        archived: bool,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, workspace_id, account_id).await?;
            let active = accounts::ActiveModel {
                id: ActiveValue::Set(account_id),
                archived: ActiveValue::Set(archived),
                is_default: ActiveValue::Set(false),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Hard delete. Rejected while any operation references the account; the
    /// reference count is an advisory read, not a held lock.
    pub async fn delete_account(&self, workspace_id: Uuid, account_id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, workspace_id, account_id).await?;

            let references = operations::Entity::find()
                .filter(operations::Column::WorkspaceId.eq(workspace_id))
                .filter(operations::Column::AccountId.eq(account_id))
                .count(&db_tx)
                .await?;
            if references > 0 {
                return Err(LedgerError::ReferentialIntegrity {
                    entity: "account".to_string(),
                    references,
                });
            }

            accounts::Entity::delete_by_id(account_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Loads an account and checks workspace scoping.
    pub(crate) async fn require_account<C: ConnectionTrait>(
        &self,
        db_tx: &C,
        workspace_id: Uuid,
        account_id: Uuid,
    ) -> ResultLedger<Account> {
        let model = accounts::Entity::find_by_id(account_id)
            .filter(accounts::Column::WorkspaceId.eq(workspace_id))
            .one(db_tx)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("account not exists".to_string()))?;
        Ok(Account::from(model))
    }

    /// Like [`require_account`](Self::require_account) but rejects archived
    /// accounts; used when recording new operations.
    pub(crate) async fn require_active_account<C: ConnectionTrait>(
        &self,
        db_tx: &C,
        workspace_id: Uuid,
        account_id: Uuid,
    ) -> ResultLedger<Account> {
        let account = self.require_account(db_tx, workspace_id, account_id).await?;
        if account.archived {
            return Err(LedgerError::Validation(format!(
                "account '{}' is archived",
                account.name
            )));
        }
        Ok(account)
    }
}
