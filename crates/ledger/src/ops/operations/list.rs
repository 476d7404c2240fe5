//! Operation listing.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::{Operation, OperationKind, OperationListFilter, ResultLedger, operations, ops::Ledger};

impl Ledger {
    /// List a workspace's operations, newest first.
    ///
    /// Tag links are not loaded here; use [`Ledger::operation`] for the
    /// detail view.
    pub async fn list_operations(
        &self,
        workspace_id: Uuid,
        filter: OperationListFilter,
    ) -> ResultLedger<Vec<Operation>> {
        let mut query = operations::Entity::find()
            .filter(operations::Column::WorkspaceId.eq(workspace_id))
            .order_by_desc(operations::Column::OccurredOn)
            .order_by_desc(operations::Column::CreatedAt);

        if let Some(account_id) = filter.account_id {
            query = query.filter(operations::Column::AccountId.eq(account_id));
        }
        if let Some(kinds) = &filter.kinds {
            let kinds: Vec<&str> = kinds.iter().map(|kind| kind.as_str()).collect();
            query = query.filter(operations::Column::Kind.is_in(kinds));
        }
        if !filter.include_transfers {
            query = query.filter(operations::Column::Kind.ne(OperationKind::Transfer.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(operations::Column::OccurredOn.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(operations::Column::OccurredOn.lte(to));
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(Operation::try_from).collect()
    }
}
