//! Operation and transfer endpoints.

use api_types::operation::{OperationListQuery, OperationNew, OperationPatch, OperationView};
use api_types::transfer::{TransferNew, TransferPatch, TransferView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use ledger::{
    Currency, Operation, OperationKind, OperationListFilter, RecordOperationCmd,
    RecordTransferCmd, TransferPair, UpdateOperationCmd, UpdateTransferCmd,
};
use uuid::Uuid;

use crate::{Identity, ServerError, server::ServerState};

fn view(op: Operation) -> OperationView {
    OperationView {
        id: op.id,
        kind: op.kind.as_str().to_string(),
        amount_minor: op.amount_minor,
        currency: op.currency.code().to_string(),
        exchange_rate: op.exchange_rate,
        base_amount_minor: op.base_amount_minor,
        account_id: op.account_id,
        transfer_direction: op.transfer_direction.map(|d| d.as_str().to_string()),
        transfer_group_id: op.transfer_group_id,
        category_id: op.category_id,
        debt_id: op.debt_id,
        debt_applied_minor: op.debt_applied_minor,
        note: op.note,
        occurred_on: op.occurred_on,
        created_by: op.created_by,
        tag_ids: op.tag_ids,
    }
}

fn transfer_view(pair: TransferPair) -> TransferView {
    TransferView {
        group_id: pair.group_id(),
        outgoing: view(pair.outgoing),
        incoming: view(pair.incoming),
    }
}

fn parse_currency(code: Option<&str>) -> Result<Option<Currency>, ServerError> {
    code.map(Currency::try_from).transpose().map_err(Into::into)
}

pub async fn record(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<Uuid>,
    Json(payload): Json<OperationNew>,
) -> Result<Json<OperationView>, ServerError> {
    let kind = OperationKind::try_from(payload.kind.as_str())?;

    let mut cmd = RecordOperationCmd::new(
        workspace_id,
        identity.0,
        kind,
        payload.amount_minor,
        payload.occurred_on,
    )
    .tags(payload.tags);
    cmd.currency = parse_currency(payload.currency.as_deref())?;
    cmd.exchange_rate = payload.exchange_rate;
    cmd.account_id = payload.account_id;
    cmd.category_id = payload.category_id;
    cmd.debt_id = payload.debt_id;
    cmd.debt_applied_minor = payload.debt_applied_minor;
    cmd.note = payload.note;

    let op = state.ledger.record_operation(cmd).await?;
    Ok(Json(view(op)))
}

pub async fn list(
    State(state): State<ServerState>,
    Path(workspace_id): Path<Uuid>,
    Query(query): Query<OperationListQuery>,
) -> Result<Json<Vec<OperationView>>, ServerError> {
    let kinds = query
        .kinds
        .as_deref()
        .map(|csv| {
            csv.split(',')
                .map(|name| OperationKind::try_from(name.trim()))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    let filter = OperationListFilter {
        account_id: query.account_id,
        kinds,
        from: query.from,
        to: query.to,
        include_transfers: query.include_transfers.unwrap_or(true),
        limit: query.limit,
    };
    let ops = state.ledger.list_operations(workspace_id, filter).await?;
    Ok(Json(ops.into_iter().map(view).collect()))
}

pub async fn detail(
    State(state): State<ServerState>,
    Path((workspace_id, operation_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<OperationView>, ServerError> {
    let op = state.ledger.operation(workspace_id, operation_id).await?;
    Ok(Json(view(op)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path((workspace_id, operation_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<OperationPatch>,
) -> Result<Json<OperationView>, ServerError> {
    let patch = UpdateOperationCmd {
        amount_minor: payload.amount_minor,
        currency: parse_currency(payload.currency.as_deref())?,
        exchange_rate: payload.exchange_rate,
        account_id: payload.account_id,
        category_id: payload.category_id,
        tags: payload.tags,
        debt_applied_minor: payload.debt_applied_minor,
        note: payload.note,
        occurred_on: payload.occurred_on,
    };
    let op = state
        .ledger
        .update_operation(workspace_id, operation_id, patch)
        .await?;
    Ok(Json(view(op)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path((workspace_id, operation_id)): Path<(Uuid, Uuid)>,
) -> Result<(), ServerError> {
    state
        .ledger
        .delete_operation(workspace_id, operation_id)
        .await?;
    Ok(())
}

pub async fn record_transfer(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(workspace_id): Path<Uuid>,
    Json(payload): Json<TransferNew>,
) -> Result<Json<TransferView>, ServerError> {
    let mut cmd = RecordTransferCmd::new(
        workspace_id,
        identity.0,
        payload.from_account_id,
        payload.to_account_id,
        payload.amount_minor,
        payload.occurred_on,
    );
    cmd.currency = parse_currency(payload.currency.as_deref())?;
    cmd.to_currency = parse_currency(payload.to_currency.as_deref())?;
    cmd.cross_rate = payload.cross_rate;
    cmd.note = payload.note;

    let pair = state.ledger.record_transfer(cmd).await?;
    Ok(Json(transfer_view(pair)))
}

pub async fn transfer_detail(
    State(state): State<ServerState>,
    Path((workspace_id, group_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<TransferView>, ServerError> {
    let pair = state.ledger.transfer(workspace_id, group_id).await?;
    Ok(Json(transfer_view(pair)))
}

pub async fn update_transfer(
    State(state): State<ServerState>,
    Path((workspace_id, group_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<TransferPatch>,
) -> Result<Json<TransferView>, ServerError> {
    let patch = UpdateTransferCmd {
        amount_minor: payload.amount_minor,
        from_account_id: payload.from_account_id,
        to_account_id: payload.to_account_id,
        currency: parse_currency(payload.currency.as_deref())?,
        to_currency: parse_currency(payload.to_currency.as_deref())?,
        cross_rate: payload.cross_rate,
        note: payload.note,
        occurred_on: payload.occurred_on,
    };
    let pair = state
        .ledger
        .update_transfer(workspace_id, group_id, patch)
        .await?;
    Ok(Json(transfer_view(pair)))
}
