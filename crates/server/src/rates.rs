//! Exchange rate endpoints.

use api_types::rate::{RateBulkUpsert, RateUpsert, RateView};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::NaiveDate;
use ledger::{Currency, ExchangeRate, RateSource};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(rate: ExchangeRate) -> RateView {
    RateView {
        from_currency: rate.from_currency.code().to_string(),
        to_currency: rate.to_currency.code().to_string(),
        rate_date: rate.rate_date,
        rate: rate.rate,
        source: rate.source.as_str().to_string(),
    }
}

pub async fn put(
    State(state): State<ServerState>,
    Path(workspace_id): Path<Uuid>,
    Json(payload): Json<RateUpsert>,
) -> Result<Json<RateView>, ServerError> {
    let from = Currency::try_from(payload.from_currency.as_str())?;
    let to = Currency::try_from(payload.to_currency.as_str())?;
    let source = match payload.source.as_deref() {
        Some(name) => RateSource::try_from(name)?,
        None => RateSource::Manual,
    };
    let rate = state
        .ledger
        .put_rate(workspace_id, from, to, payload.rate_date, payload.rate, source)
        .await?;
    Ok(Json(view(rate)))
}

pub async fn list(
    State(state): State<ServerState>,
    Path(workspace_id): Path<Uuid>,
) -> Result<Json<Vec<RateView>>, ServerError> {
    let rates = state.ledger.list_rates(workspace_id).await?;
    Ok(Json(rates.into_iter().map(view).collect()))
}

pub async fn bulk_upsert(
    State(state): State<ServerState>,
    Path(workspace_id): Path<Uuid>,
    Json(payload): Json<RateBulkUpsert>,
) -> Result<Json<usize>, ServerError> {
    let source = RateSource::try_from(payload.source.as_str())?;
    let observations = payload
        .rates
        .into_iter()
        .map(|observation| {
            let from = Currency::try_from(observation.from_currency.as_str())?;
            let to = Currency::try_from(observation.to_currency.as_str())?;
            Ok((from, to, observation.rate_date, observation.rate))
        })
        .collect::<Result<Vec<(Currency, Currency, NaiveDate, f64)>, ServerError>>()?;

    let written = state
        .ledger
        .upsert_rates(workspace_id, source, &observations)
        .await?;
    Ok(Json(written))
}
