//! Debt endpoints.

use api_types::debt::{DebtNew, DebtView};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use ledger::{DebtDirection, DebtOverview};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

#[derive(Debug, Default, Deserialize)]
pub struct DebtListQuery {
    pub include_archived: Option<bool>,
}

fn view(overview: DebtOverview) -> DebtView {
    DebtView {
        id: overview.debt.id,
        direction: overview.debt.direction.as_str().to_string(),
        title: overview.debt.title,
        counterparty: overview.debt.counterparty,
        initial_minor: overview.debt.initial_minor,
        remaining_minor: overview.remaining.minor(),
        progress_pct: overview.progress_pct,
        opened_on: overview.debt.opened_on,
        due_on: overview.debt.due_on,
        archived: overview.debt.archived,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Path(workspace_id): Path<Uuid>,
    Json(payload): Json<DebtNew>,
) -> Result<Json<DebtView>, ServerError> {
    let direction = DebtDirection::try_from(payload.direction.as_str())?;
    let debt = state
        .ledger
        .create_debt(
            workspace_id,
            direction,
            &payload.title,
            &payload.counterparty,
            payload.initial_minor,
            payload.opened_on,
            payload.due_on,
            payload.notes.as_deref(),
        )
        .await?;
    let overview = state.ledger.debt_overview(workspace_id, debt.id).await?;
    Ok(Json(view(overview)))
}

pub async fn list(
    State(state): State<ServerState>,
    Path(workspace_id): Path<Uuid>,
    Query(query): Query<DebtListQuery>,
) -> Result<Json<Vec<DebtView>>, ServerError> {
    let debts = state
        .ledger
        .list_debts(workspace_id, query.include_archived.unwrap_or(false))
        .await?;
    Ok(Json(debts.into_iter().map(view).collect()))
}

pub async fn detail(
    State(state): State<ServerState>,
    Path((workspace_id, debt_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<DebtView>, ServerError> {
    let overview = state.ledger.debt_overview(workspace_id, debt_id).await?;
    Ok(Json(view(overview)))
}

pub async fn archive(
    State(state): State<ServerState>,
    Path((workspace_id, debt_id)): Path<(Uuid, Uuid)>,
) -> Result<(), ServerError> {
    state.ledger.archive_debt(workspace_id, debt_id, true).await?;
    Ok(())
}

pub async fn remove(
    State(state): State<ServerState>,
    Path((workspace_id, debt_id)): Path<(Uuid, Uuid)>,
) -> Result<(), ServerError> {
    state.ledger.delete_debt(workspace_id, debt_id).await?;
    Ok(())
}
