use chrono::NaiveDate;
use sea_orm::{
    ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::OnConflict,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, ExchangeRate, Money, RateSource, ResultLedger, exchange_rates};

use super::{Ledger, with_tx};

/// Outcome of a rate lookup.
///
/// `exact` is false when the resolver fell back to the most recent
/// observation for the pair instead of a date-exact one; callers should
/// surface that so UIs can flag "approximate rate used". Falling back to
/// *any* historical rate is deliberate: staleness is preferred over blocking
/// entry when no date-exact rate exists.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRate {
    pub rate: f64,
    /// Date of the observation the rate came from.
    pub rate_date: NaiveDate,
    /// True when the observation matches the requested date.
    pub exact: bool,
    /// True when the stored observation was for the opposite direction.
    pub inverted: bool,
}

impl Ledger {
    /// Records a single rate observation, replacing any existing observation
    /// for the same `(workspace, from, to, date)` key.
    pub async fn put_rate(
        &self,
        workspace_id: Uuid,
        from: Currency,
        to: Currency,
        rate_date: NaiveDate,
        rate: f64,
        source: RateSource,
    ) -> ResultLedger<ExchangeRate> {
        let observation = ExchangeRate::new(workspace_id, from, to, rate_date, rate, source)?;
        with_tx!(self, |db_tx| {
            self.require_workspace(&db_tx, workspace_id).await?;
            insert_observation(&db_tx, &observation).await?;
            Ok(observation.clone())
        })
    }

    /// Bulk upsert used by the external feed-refresh job. All observations
    /// land in one transaction; a single bad row rejects the whole batch.
    pub async fn upsert_rates(
        &self,
        workspace_id: Uuid,
        source: RateSource,
        observations: &[(Currency, Currency, NaiveDate, f64)],
    ) -> ResultLedger<usize> {
        with_tx!(self, |db_tx| {
            self.require_workspace(&db_tx, workspace_id).await?;
            for &(from, to, rate_date, rate) in observations {
                let observation =
                    ExchangeRate::new(workspace_id, from, to, rate_date, rate, source)?;
                insert_observation(&db_tx, &observation).await?;
            }
            tracing::debug!(
                workspace_id = %workspace_id,
                count = observations.len(),
                source = source.as_str(),
                "rates refreshed"
            );
            Ok(observations.len())
        })
    }

    /// Lists stored observations, newest first.
    pub async fn list_rates(&self, workspace_id: Uuid) -> ResultLedger<Vec<ExchangeRate>> {
        let models = exchange_rates::Entity::find()
            .filter(exchange_rates::Column::WorkspaceId.eq(workspace_id))
            .order_by_desc(exchange_rates::Column::RateDate)
            .all(&self.database)
            .await?;
        models.into_iter().map(ExchangeRate::try_from).collect()
    }

    /// Resolves a conversion rate between two currencies for a date.
    ///
    /// Strict priority, first match wins:
    /// 1. exact observation `(from -> to, date)`
    /// 2. exact observation `(to -> from, date)`, inverted
    /// 3. most recent observation `(from -> to)` regardless of date
    /// 4. most recent observation `(to -> from)`, inverted
    /// 5. `None`
    ///
    /// `from == to` short-circuits to rate 1 with no store lookup. An
    /// inverted match with an observed rate of 0 resolves to `None` (the
    /// match wins the priority, the inversion fails).
    pub async fn resolve_rate(
        &self,
        workspace_id: Uuid,
        from: Currency,
        to: Currency,
        date: NaiveDate,
    ) -> ResultLedger<Option<ResolvedRate>> {
        resolve_rate_on(&self.database, workspace_id, from, to, date).await
    }

    /// Converts an amount to the workspace base currency.
    ///
    /// Returns `None` when no rate can be resolved; callers must treat that
    /// as "cannot post in base currency" and either block the write or
    /// require an explicit manual rate.
    pub async fn convert_to_base(
        &self,
        workspace_id: Uuid,
        amount: Money,
        from: Currency,
        date: NaiveDate,
    ) -> ResultLedger<Option<(Money, ResolvedRate)>> {
        let base = self.workspace(workspace_id).await?.base_currency;
        let Some(resolved) = resolve_rate_on(&self.database, workspace_id, from, base, date).await?
        else {
            return Ok(None);
        };
        Ok(Some((amount.convert(resolved.rate), resolved)))
    }
}

async fn insert_observation<C: ConnectionTrait>(
    db_tx: &C,
    observation: &ExchangeRate,
) -> ResultLedger<()> {
    exchange_rates::Entity::insert(exchange_rates::ActiveModel::from(observation))
        .on_conflict(
            OnConflict::columns([
                exchange_rates::Column::WorkspaceId,
                exchange_rates::Column::FromCurrency,
                exchange_rates::Column::ToCurrency,
                exchange_rates::Column::RateDate,
            ])
            .update_columns([
                exchange_rates::Column::Rate,
                exchange_rates::Column::Source,
            ])
            .to_owned(),
        )
        .exec(db_tx)
        .await?;
    Ok(())
}

/// Transaction-scoped resolver; operation writes call this so the rate they
/// record is read inside the same transaction as the write.
pub(crate) async fn resolve_rate_on<C: ConnectionTrait>(
    db: &C,
    workspace_id: Uuid,
    from: Currency,
    to: Currency,
    date: NaiveDate,
) -> ResultLedger<Option<ResolvedRate>> {
    if from == to {
        return Ok(Some(ResolvedRate {
            rate: 1.0,
            rate_date: date,
            exact: true,
            inverted: false,
        }));
    }

    let direct = |a: Currency, b: Currency| {
        exchange_rates::Entity::find()
            .filter(exchange_rates::Column::WorkspaceId.eq(workspace_id))
            .filter(exchange_rates::Column::FromCurrency.eq(a.code()))
            .filter(exchange_rates::Column::ToCurrency.eq(b.code()))
    };

    // 1. Exact date, stored direction.
    if let Some(model) = direct(from, to)
        .filter(exchange_rates::Column::RateDate.eq(date))
        .one(db)
        .await?
    {
        return Ok(Some(ResolvedRate {
            rate: model.rate,
            rate_date: model.rate_date,
            exact: true,
            inverted: false,
        }));
    }

    // 2. Exact date, opposite direction, inverted.
    if let Some(model) = direct(to, from)
        .filter(exchange_rates::Column::RateDate.eq(date))
        .one(db)
        .await?
    {
        if model.rate == 0.0 {
            return Ok(None);
        }
        return Ok(Some(ResolvedRate {
            rate: 1.0 / model.rate,
            rate_date: model.rate_date,
            exact: true,
            inverted: true,
        }));
    }

    // 3. Most recent observation, stored direction (independent of the
    // requested date).
    if let Some(model) = direct(from, to)
        .order_by_desc(exchange_rates::Column::RateDate)
        .one(db)
        .await?
    {
        return Ok(Some(ResolvedRate {
            rate: model.rate,
            rate_date: model.rate_date,
            exact: false,
            inverted: false,
        }));
    }

    // 4. Most recent observation, opposite direction, inverted.
    if let Some(model) = direct(to, from)
        .order_by_desc(exchange_rates::Column::RateDate)
        .one(db)
        .await?
    {
        if model.rate == 0.0 {
            return Ok(None);
        }
        return Ok(Some(ResolvedRate {
            rate: 1.0 / model.rate,
            rate_date: model.rate_date,
            exact: false,
            inverted: true,
        }));
    }

    Ok(None)
}
