//! Derived account balances.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{Money, Operation, ResultLedger, accounts, operations};

use super::Ledger;

impl Ledger {
    /// Balance of every account in the workspace, in base-currency minor
    /// units, derived by a single scan of the account-linked operations.
    ///
    /// Every account appears in the map; untouched and archived ones report
    /// zero or their last derived value. Nothing is cached: the map always
    /// reflects the operations currently on disk.
    pub async fn balances_for(&self, workspace_id: Uuid) -> ResultLedger<HashMap<Uuid, Money>> {
        self.require_workspace(&self.database, workspace_id).await?;

        let mut balances: HashMap<Uuid, Money> = accounts::Entity::find()
            .filter(accounts::Column::WorkspaceId.eq(workspace_id))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|model| (model.id, Money::ZERO))
            .collect();

        let models = operations::Entity::find()
            .filter(operations::Column::WorkspaceId.eq(workspace_id))
            .filter(operations::Column::AccountId.is_not_null())
            .all(&self.database)
            .await?;
        for model in models {
            let op = Operation::try_from(model)?;
            if let Some(account_id) = op.account_id {
                let entry = balances.entry(account_id).or_insert(Money::ZERO);
                *entry = *entry + op.signed_base_effect();
            }
        }
        Ok(balances)
    }

    /// Balance of a single account.
    pub async fn account_balance(
        &self,
        workspace_id: Uuid,
        account_id: Uuid,
    ) -> ResultLedger<Money> {
        self.require_account(&self.database, workspace_id, account_id)
            .await?;
        let models = operations::Entity::find()
            .filter(operations::Column::WorkspaceId.eq(workspace_id))
            .filter(operations::Column::AccountId.eq(account_id))
            .all(&self.database)
            .await?;
        let mut balance = Money::ZERO;
        for model in models {
            balance = balance + Operation::try_from(model)?.signed_base_effect();
        }
        Ok(balance)
    }
}
