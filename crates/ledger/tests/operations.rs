use chrono::NaiveDate;
use sea_orm::Database;
use uuid::Uuid;

use ledger::{
    CategoryKind, Currency, Ledger, LedgerError, OperationKind, OperationListFilter,
    RateSource, RecordOperationCmd, UpdateOperationCmd, Workspace,
};
use migration::MigratorTrait;

async fn ledger_with_workspace() -> (Ledger, Workspace) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder().database(db).build();
    let workspace = ledger
        .create_workspace("Main", eur(), "alice")
        .await
        .unwrap();
    (ledger, workspace)
}

fn eur() -> Currency {
    Currency::try_from("EUR").unwrap()
}

fn usd() -> Currency {
    Currency::try_from("USD").unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

async fn cash_account(ledger: &Ledger, workspace_id: Uuid) -> Uuid {
    ledger
        .list_accounts(workspace_id)
        .await
        .unwrap()
        .into_iter()
        .find(|a| a.name == "Cash")
        .expect("seeded Cash account missing")
        .id
}

#[tokio::test]
async fn income_and_expense_update_the_account_balance() {
    let (ledger, ws) = ledger_with_workspace().await;
    let cash = cash_account(&ledger, ws.id).await;

    ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Income, 10_000, day(1))
                .account_id(cash),
        )
        .await
        .unwrap();
    ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Expense, 3_000, day(2))
                .account_id(cash),
        )
        .await
        .unwrap();

    let balances = ledger.balances_for(ws.id).await.unwrap();
    assert_eq!(balances[&cash].minor(), 7_000);
}

#[tokio::test]
async fn salary_is_an_outflow() {
    let (ledger, ws) = ledger_with_workspace().await;
    let cash = cash_account(&ledger, ws.id).await;

    ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Income, 10_000, day(1))
                .account_id(cash),
        )
        .await
        .unwrap();
    ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Salary, 2_000, day(2))
                .account_id(cash),
        )
        .await
        .unwrap();

    let balances = ledger.balances_for(ws.id).await.unwrap();
    assert_eq!(balances[&cash].minor(), 8_000);
}

#[tokio::test]
async fn zero_amount_is_rejected() {
    let (ledger, ws) = ledger_with_workspace().await;

    let err = ledger
        .record_operation(RecordOperationCmd::new(
            ws.id,
            "alice",
            OperationKind::Expense,
            0,
            day(1),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn category_kind_must_match_operation_kind() {
    let (ledger, ws) = ledger_with_workspace().await;
    let salary_cat = ledger
        .create_category(ws.id, "Wages", CategoryKind::Income)
        .await
        .unwrap();

    let err = ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Expense, 1_000, day(1))
                .category_id(salary_cat.id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    // Salary books against expense categories.
    let rent_cat = ledger
        .create_category(ws.id, "Rent", CategoryKind::Expense)
        .await
        .unwrap();
    ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Salary, 1_000, day(1))
                .category_id(rent_cat.id),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn tags_are_upserted_and_deduplicated() {
    let (ledger, ws) = ledger_with_workspace().await;

    let op = ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Expense, 1_500, day(3))
                .tags(["Food", "food", "Trip"]),
        )
        .await
        .unwrap();

    // "Food" and "food" normalize to the same tag.
    assert_eq!(op.tag_ids.len(), 2);
    assert_eq!(ledger.list_tags(ws.id).await.unwrap().len(), 2);

    let detail = ledger.operation(ws.id, op.id).await.unwrap();
    assert_eq!(detail.tag_ids.len(), 2);
}

#[tokio::test]
async fn foreign_currency_without_rate_is_rejected() {
    let (ledger, ws) = ledger_with_workspace().await;

    let err = ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Expense, 10_000, day(10))
                .currency(usd()),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::RateUnresolved {
            from: "USD".to_string(),
            to: "EUR".to_string(),
        }
    );
}

#[tokio::test]
async fn explicit_rate_fixes_the_base_amount() {
    let (ledger, ws) = ledger_with_workspace().await;
    let cash = cash_account(&ledger, ws.id).await;

    let op = ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Income, 10_000, day(10))
                .account_id(cash)
                .currency(usd())
                .exchange_rate(0.92),
        )
        .await
        .unwrap();

    assert_eq!(op.exchange_rate, Some(0.92));
    assert_eq!(op.base_amount_minor, Some(9_200));

    // The balance books the base amount, not the foreign one.
    let balances = ledger.balances_for(ws.id).await.unwrap();
    assert_eq!(balances[&cash].minor(), 9_200);
}

#[tokio::test]
async fn stored_rate_prices_a_foreign_currency_expense() {
    let (ledger, ws) = ledger_with_workspace().await;
    let cash = cash_account(&ledger, ws.id).await;
    ledger
        .put_rate(ws.id, usd(), eur(), day(10), 1.08, RateSource::Manual)
        .await
        .unwrap();

    // No explicit rate on the write; the date-exact observation prices it.
    let op = ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Expense, 10_000, day(10))
                .account_id(cash)
                .currency(usd()),
        )
        .await
        .unwrap();

    assert_eq!(op.exchange_rate, Some(1.08));
    assert_eq!(op.base_amount_minor, Some(10_800));
    let balances = ledger.balances_for(ws.id).await.unwrap();
    assert_eq!(balances[&cash].minor(), -10_800);
}

#[tokio::test]
async fn base_currency_operation_stores_no_rate() {
    let (ledger, ws) = ledger_with_workspace().await;

    let op = ledger
        .record_operation(RecordOperationCmd::new(
            ws.id,
            "alice",
            OperationKind::Income,
            5_000,
            day(4),
        ))
        .await
        .unwrap();
    assert_eq!(op.exchange_rate, None);
    assert_eq!(op.base_amount_minor, None);
    assert_eq!(op.base_amount().minor(), 5_000);
}

#[tokio::test]
async fn update_reprices_on_amount_change() {
    let (ledger, ws) = ledger_with_workspace().await;

    let op = ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Expense, 10_000, day(10))
                .currency(usd())
                .exchange_rate(0.92),
        )
        .await
        .unwrap();

    let updated = ledger
        .update_operation(
            ws.id,
            op.id,
            UpdateOperationCmd {
                amount_minor: Some(20_000),
                exchange_rate: Some(0.92),
                ..UpdateOperationCmd::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.base_amount_minor, Some(18_400));
}

#[tokio::test]
async fn delete_restores_the_previous_balance() {
    let (ledger, ws) = ledger_with_workspace().await;
    let cash = cash_account(&ledger, ws.id).await;

    let op = ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Income, 4_200, day(5))
                .account_id(cash)
                .tags(["bonus"]),
        )
        .await
        .unwrap();
    assert_eq!(
        ledger.balances_for(ws.id).await.unwrap()[&cash].minor(),
        4_200
    );

    ledger.delete_operation(ws.id, op.id).await.unwrap();
    assert_eq!(ledger.balances_for(ws.id).await.unwrap()[&cash].minor(), 0);
    assert!(matches!(
        ledger.operation(ws.id, op.id).await.unwrap_err(),
        LedgerError::KeyNotFound(_)
    ));
}

#[tokio::test]
async fn operations_are_scoped_to_their_workspace() {
    let (ledger, ws) = ledger_with_workspace().await;
    let other = ledger
        .create_workspace("Side", eur(), "alice")
        .await
        .unwrap();

    let op = ledger
        .record_operation(RecordOperationCmd::new(
            ws.id,
            "alice",
            OperationKind::Income,
            1_000,
            day(1),
        ))
        .await
        .unwrap();

    assert!(matches!(
        ledger.operation(other.id, op.id).await.unwrap_err(),
        LedgerError::KeyNotFound(_)
    ));
    assert!(ledger
        .list_operations(other.id, OperationListFilter::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn list_filters_by_kind_and_date_range() {
    let (ledger, ws) = ledger_with_workspace().await;

    for (kind, amount, d) in [
        (OperationKind::Income, 1_000, 1),
        (OperationKind::Expense, 2_000, 5),
        (OperationKind::Expense, 3_000, 20),
    ] {
        ledger
            .record_operation(RecordOperationCmd::new(ws.id, "alice", kind, amount, day(d)))
            .await
            .unwrap();
    }

    let expenses = ledger
        .list_operations(
            ws.id,
            OperationListFilter {
                kinds: Some(vec![OperationKind::Expense]),
                from: Some(day(1)),
                to: Some(day(10)),
                ..OperationListFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount_minor, 2_000);
}

#[tokio::test]
async fn summary_over_a_range_totals_by_kind() {
    let (ledger, ws) = ledger_with_workspace().await;

    for (kind, amount, d) in [
        (OperationKind::Income, 120_000, 1),
        (OperationKind::Expense, 30_000, 2),
        (OperationKind::Salary, 10_000, 3),
        (OperationKind::Income, 99_999, 25), // outside the range
    ] {
        ledger
            .record_operation(RecordOperationCmd::new(ws.id, "alice", kind, amount, day(d)))
            .await
            .unwrap();
    }

    let summary = ledger
        .summary(
            ws.id,
            ledger::Period::Range {
                from: day(1),
                to: day(10),
            },
        )
        .await
        .unwrap();
    assert_eq!(summary.income.minor(), 120_000);
    assert_eq!(summary.expense.minor(), 30_000);
    assert_eq!(summary.salary.minor(), 10_000);
    assert_eq!(summary.total.minor(), 80_000);
}

#[tokio::test]
async fn archived_account_rejects_new_operations() {
    let (ledger, ws) = ledger_with_workspace().await;
    let cash = cash_account(&ledger, ws.id).await;
    ledger.archive_account(ws.id, cash, true).await.unwrap();

    let err = ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Income, 1_000, day(1))
                .account_id(cash),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn referenced_account_cannot_be_deleted() {
    let (ledger, ws) = ledger_with_workspace().await;
    let cash = cash_account(&ledger, ws.id).await;

    ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Income, 1_000, day(1))
                .account_id(cash),
        )
        .await
        .unwrap();

    let err = ledger.delete_account(ws.id, cash).await.unwrap_err();
    assert_eq!(
        err,
        LedgerError::ReferentialIntegrity {
            entity: "account".to_string(),
            references: 1,
        }
    );
}
