//! Account endpoints, including the derived balances read.

use api_types::account::{
    AccountBalance, AccountNew, AccountRename, AccountView, BalancesResponse,
};
use axum::{
    Json,
    extract::{Path, State},
};
use ledger::Account;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(account: Account) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        color: account.color,
        is_default: account.is_default,
        archived: account.archived,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Path(workspace_id): Path<Uuid>,
    Json(payload): Json<AccountNew>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state
        .ledger
        .create_account(workspace_id, &payload.name, payload.color.as_deref())
        .await?;
    Ok(Json(view(account)))
}

pub async fn list(
    State(state): State<ServerState>,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<Vec<AccountView>>, ServerError> {
    let accounts = state.ledger.list_accounts(workspace_id).await?;
    Ok(Json(accounts.into_iter().map(view).collect()))
}

pub async fn rename(
    State(state): State<ServerState>,
    Path((workspace_id, account_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<AccountRename>,
) -> Result<(), ServerError> {
    state
        .ledger
        .rename_account(workspace_id, account_id, &payload.name)
        .await?;
    Ok(())
}

pub async fn set_default(
    State(state): State<ServerState>,
    Path((workspace_id, account_id)): Path<(Uuid, Uuid)>,
) -> Result<(), ServerError> {
    state
        .ledger
        .set_default_account(workspace_id, account_id)
        .await?;
    Ok(())
}

pub async fn archive(
    State(state): State<ServerState>,
    Path((workspace_id, account_id)): Path<(Uuid, Uuid)>,
) -> Result<(), ServerError> {
    state
        .ledger
        .archive_account(workspace_id, account_id, true)
        .await?;
    Ok(())
}

pub async fn remove(
    State(state): State<ServerState>,
    Path((workspace_id, account_id)): Path<(Uuid, Uuid)>,
) -> Result<(), ServerError> {
    state.ledger.delete_account(workspace_id, account_id).await?;
    Ok(())
}

pub async fn balances(
    State(state): State<ServerState>,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let balances = state.ledger.balances_for(workspace_id).await?;
    let mut balances: Vec<AccountBalance> = balances
        .into_iter()
        .map(|(account_id, balance)| AccountBalance {
            account_id,
            balance_minor: balance.minor(),
        })
        .collect();
    balances.sort_by_key(|b| b.account_id);
    Ok(Json(BalancesResponse { balances }))
}
