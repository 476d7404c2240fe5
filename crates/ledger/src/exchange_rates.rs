//! Exchange-rate observations.
//!
//! Each row is a directional observation `(from → to, rate_date, rate)` for
//! one workspace, unique per `(workspace, from, to, date)`. Rows come from
//! explicit manual entry or from an external feed-refresh job that bulk
//! upserts; the ledger never calls a feed itself. Resolution order lives in
//! `ops::rates`.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, LedgerError};

/// Where a rate observation came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Manual,
    Ecb,
    Openexchange,
}

impl RateSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Ecb => "ecb",
            Self::Openexchange => "openexchange",
        }
    }
}

impl TryFrom<&str> for RateSource {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "manual" => Ok(Self::Manual),
            "ecb" => Ok(Self::Ecb),
            "openexchange" => Ok(Self::Openexchange),
            other => Err(LedgerError::Validation(format!(
                "invalid rate source: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub from_currency: Currency,
    pub to_currency: Currency,
    pub rate_date: NaiveDate,
    pub rate: f64,
    pub source: RateSource,
}

impl ExchangeRate {
    pub fn new(
        workspace_id: Uuid,
        from_currency: Currency,
        to_currency: Currency,
        rate_date: NaiveDate,
        rate: f64,
        source: RateSource,
    ) -> Result<Self, LedgerError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(LedgerError::Validation(format!(
                "rate must be finite and > 0, got {rate}"
            )));
        }
        if from_currency == to_currency {
            return Err(LedgerError::Validation(
                "from_currency and to_currency must differ".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            workspace_id,
            from_currency,
            to_currency,
            rate_date,
            rate,
            source,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exchange_rates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub from_currency: String,
    pub to_currency: String,
    pub rate_date: Date,
    pub rate: f64,
    pub source: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workspaces::Entity",
        from = "Column::WorkspaceId",
        to = "super::workspaces::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Workspace,
}

impl Related<super::workspaces::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspace.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ExchangeRate> for ActiveModel {
    fn from(rate: &ExchangeRate) -> Self {
        Self {
            id: ActiveValue::Set(rate.id),
            workspace_id: ActiveValue::Set(rate.workspace_id),
            from_currency: ActiveValue::Set(rate.from_currency.code().to_string()),
            to_currency: ActiveValue::Set(rate.to_currency.code().to_string()),
            rate_date: ActiveValue::Set(rate.rate_date),
            rate: ActiveValue::Set(rate.rate),
            source: ActiveValue::Set(rate.source.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for ExchangeRate {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            workspace_id: model.workspace_id,
            from_currency: Currency::try_from(model.from_currency.as_str())?,
            to_currency: Currency::try_from(model.to_currency.as_str())?,
            rate_date: model.rate_date,
            rate: model.rate,
            source: RateSource::try_from(model.source.as_str())?,
        })
    }
}
