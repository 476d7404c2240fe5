//! Category and tag endpoints.

use api_types::category::{CategoryNew, CategoryView};
use api_types::tag::TagView;
use axum::{
    Json,
    extract::{Path, State},
};
use ledger::CategoryKind;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(category: ledger::categories::Model) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        kind: category.kind,
        archived: category.archived,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Path(workspace_id): Path<Uuid>,
    Json(payload): Json<CategoryNew>,
) -> Result<Json<CategoryView>, ServerError> {
    let kind = CategoryKind::try_from(payload.kind.as_str())?;
    let category = state
        .ledger
        .create_category(workspace_id, &payload.name, kind)
        .await?;
    Ok(Json(view(category)))
}

pub async fn list(
    State(state): State<ServerState>,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.ledger.list_categories(workspace_id).await?;
    Ok(Json(categories.into_iter().map(view).collect()))
}

pub async fn archive(
    State(state): State<ServerState>,
    Path((workspace_id, category_id)): Path<(Uuid, Uuid)>,
) -> Result<(), ServerError> {
    state
        .ledger
        .archive_category(workspace_id, category_id, true)
        .await?;
    Ok(())
}

pub async fn remove(
    State(state): State<ServerState>,
    Path((workspace_id, category_id)): Path<(Uuid, Uuid)>,
) -> Result<(), ServerError> {
    state
        .ledger
        .delete_category(workspace_id, category_id)
        .await?;
    Ok(())
}

pub async fn list_tags(
    State(state): State<ServerState>,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<Vec<TagView>>, ServerError> {
    let tags = state.ledger.list_tags(workspace_id).await?;
    Ok(Json(
        tags.into_iter()
            .map(|tag| TagView {
                id: tag.id,
                name: tag.name,
            })
            .collect(),
    ))
}

pub async fn remove_tag(
    State(state): State<ServerState>,
    Path((workspace_id, tag_id)): Path<(Uuid, Uuid)>,
) -> Result<(), ServerError> {
    state.ledger.delete_tag(workspace_id, tag_id).await?;
    Ok(())
}
