//! Workspace endpoints.

use api_types::workspace::{WorkspaceNew, WorkspaceView};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use ledger::{Currency, Workspace};
use uuid::Uuid;

use crate::{Identity, ServerError, server::ServerState};

fn view(workspace: Workspace) -> WorkspaceView {
    WorkspaceView {
        id: workspace.id,
        name: workspace.name,
        base_currency: workspace.base_currency.code().to_string(),
    }
}

pub async fn create(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Json(payload): Json<WorkspaceNew>,
) -> Result<Json<WorkspaceView>, ServerError> {
    let base_currency = match payload.base_currency.as_deref() {
        Some(code) => Currency::try_from(code)?,
        None => Currency::try_from("EUR")?,
    };
    let workspace = state
        .ledger
        .create_workspace(&payload.name, base_currency, &identity.0)
        .await?;
    Ok(Json(view(workspace)))
}

pub async fn list(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<WorkspaceView>>, ServerError> {
    let workspaces = state.ledger.workspaces_for(&identity.0).await?;
    Ok(Json(workspaces.into_iter().map(view).collect()))
}

pub async fn detail(
    State(state): State<ServerState>,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<WorkspaceView>, ServerError> {
    let workspace = state.ledger.workspace(workspace_id).await?;
    Ok(Json(view(workspace)))
}
