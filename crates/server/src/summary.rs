//! Period summary endpoint.

use api_types::summary::{SummaryQuery, SummaryView};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use ledger::Period;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn period_from(query: SummaryQuery) -> Result<Period, ServerError> {
    match query.period.as_deref() {
        Some("today") => Ok(Period::Today),
        Some("month") => Ok(Period::CurrentMonth),
        Some(other) => Err(ServerError::Generic(format!(
            "unknown period '{other}', expected 'today' or 'month'"
        ))),
        None => match (query.from, query.to) {
            (Some(from), Some(to)) => Ok(Period::Range { from, to }),
            _ => Err(ServerError::Generic(
                "either period=today|month or both from and to are required".to_string(),
            )),
        },
    }
}

pub async fn get(
    State(state): State<ServerState>,
    Path(workspace_id): Path<Uuid>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryView>, ServerError> {
    let period = period_from(query)?;
    let summary = state.ledger.summary(workspace_id, period).await?;
    Ok(Json(SummaryView {
        income_minor: summary.income.minor(),
        expense_minor: summary.expense.minor(),
        salary_minor: summary.salary.minor(),
        total_minor: summary.total.minor(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn named_periods_parse() {
        assert!(matches!(
            period_from(SummaryQuery {
                period: Some("today".to_string()),
                ..Default::default()
            }),
            Ok(Period::Today)
        ));
        assert!(matches!(
            period_from(SummaryQuery {
                period: Some("month".to_string()),
                ..Default::default()
            }),
            Ok(Period::CurrentMonth)
        ));
    }

    #[test]
    fn explicit_range_needs_both_bounds() {
        let from = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(
            period_from(SummaryQuery {
                from: Some(from),
                ..Default::default()
            })
            .is_err()
        );
        assert!(matches!(
            period_from(SummaryQuery {
                from: Some(from),
                to: Some(from),
                ..Default::default()
            }),
            Ok(Period::Range { .. })
        ));
    }

    #[test]
    fn unknown_period_is_rejected() {
        assert!(
            period_from(SummaryQuery {
                period: Some("year".to_string()),
                ..Default::default()
            })
            .is_err()
        );
    }
}
