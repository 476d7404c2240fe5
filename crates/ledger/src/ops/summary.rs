//! Period summaries over base-currency amounts.
//!
//! Aggregation is a pure function over already-loaded operations; the
//! `Ledger` method only fetches the rows for the period and delegates.
//! Periods are inclusive local calendar-date ranges, never timestamp
//! comparisons.

use chrono::{Datelike, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Money, Operation, OperationKind, OperationListFilter, ResultLedger,
};

use super::Ledger;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Today,
    CurrentMonth,
    Range { from: NaiveDate, to: NaiveDate },
}

impl Period {
    /// Inclusive `occurred_on` bounds for this period, evaluated against the
    /// local calendar date.
    #[must_use]
    pub fn bounds(self) -> (NaiveDate, NaiveDate) {
        let today = Local::now().date_naive();
        match self {
            Self::Today => (today, today),
            Self::CurrentMonth => month_bounds(today),
            Self::Range { from, to } => (from, to),
        }
    }
}

fn month_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.with_day(1).unwrap_or(today);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(today);
    (start, end)
}

/// Base-currency totals for a period. Salary counts as an outflow distinct
/// from expenses; transfers move money between accounts and are excluded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub income: Money,
    pub expense: Money,
    pub salary: Money,
    pub total: Money,
}

/// Aggregate the given operations into a [`Summary`].
#[must_use]
pub fn summarize(operations: &[Operation]) -> Summary {
    let mut summary = Summary::default();
    for op in operations {
        let base = op.base_amount();
        match op.kind {
            OperationKind::Income => summary.income = summary.income + base,
            OperationKind::Expense => summary.expense = summary.expense + base,
            OperationKind::Salary => summary.salary = summary.salary + base,
            OperationKind::Transfer => {}
        }
    }
    summary.total = summary.income - summary.expense - summary.salary;
    summary
}

impl Ledger {
    pub async fn summary(&self, workspace_id: Uuid, period: Period) -> ResultLedger<Summary> {
        let (from, to) = period.bounds();
        let operations = self
            .list_operations(
                workspace_id,
                OperationListFilter {
                    from: Some(from),
                    to: Some(to),
                    include_transfers: false,
                    ..OperationListFilter::default()
                },
            )
            .await?;
        Ok(summarize(&operations))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use crate::{Currency, Operation, OperationKind};

    use super::*;

    fn op(kind: OperationKind, amount_minor: i64, base_minor: Option<i64>) -> Operation {
        let mut op = Operation::new(
            Uuid::new_v4(),
            kind,
            amount_minor,
            Currency::try_from("EUR").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            "user".to_string(),
        )
        .unwrap();
        op.base_amount_minor = base_minor;
        op
    }

    #[test]
    fn summary_totals_by_kind() {
        let ops = vec![
            op(OperationKind::Income, 10_000, None),
            op(OperationKind::Income, 2_500, None),
            op(OperationKind::Expense, 3_000, None),
            op(OperationKind::Salary, 1_000, None),
        ];
        let summary = summarize(&ops);
        assert_eq!(summary.income.minor(), 12_500);
        assert_eq!(summary.expense.minor(), 3_000);
        assert_eq!(summary.salary.minor(), 1_000);
        assert_eq!(summary.total.minor(), 8_500);
    }

    #[test]
    fn summary_uses_base_amounts_and_skips_transfers() {
        let mut transfer = op(OperationKind::Transfer, 99_999, None);
        transfer.transfer_direction = Some(crate::TransferDirection::Out);
        let ops = vec![
            // 100 USD booked as 92 EUR base.
            op(OperationKind::Income, 10_000, Some(9_200)),
            transfer,
        ];
        let summary = summarize(&ops);
        assert_eq!(summary.income.minor(), 9_200);
        assert_eq!(summary.total.minor(), 9_200);
    }

    #[test]
    fn empty_summary_is_zero() {
        assert_eq!(summarize(&[]), Summary::default());
    }

    #[test]
    fn month_bounds_cover_the_whole_month() {
        let (start, end) = month_bounds(NaiveDate::from_ymd_opt(2025, 2, 14).unwrap());
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());

        let (start, end) = month_bounds(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }
}
