use chrono::NaiveDate;
use sea_orm::Database;
use uuid::Uuid;

use ledger::{
    Currency, Debt, DebtDirection, Ledger, LedgerError, OperationKind, RecordOperationCmd,
    UpdateOperationCmd, Workspace,
};
use migration::MigratorTrait;

async fn ledger_with_debt() -> (Ledger, Workspace, Debt) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder().database(db).build();
    let workspace = ledger
        .create_workspace("Main", eur(), "alice")
        .await
        .unwrap();
    // 1000.00 owed to the bank.
    let debt = ledger
        .create_debt(
            workspace.id,
            DebtDirection::IOwe,
            "Car loan",
            "Bank",
            100_000,
            day(1),
            None,
            None,
        )
        .await
        .unwrap();
    (ledger, workspace, debt)
}

fn eur() -> Currency {
    Currency::try_from("EUR").unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

async fn repay(ledger: &Ledger, ws: Uuid, debt: Uuid, amount: i64, applied: i64, d: u32) -> ledger::Operation {
    ledger
        .record_operation(
            RecordOperationCmd::new(ws, "alice", OperationKind::Expense, amount, day(d))
                .debt(debt, applied),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn remaining_and_progress_are_derived() {
    let (ledger, ws, debt) = ledger_with_debt().await;
    repay(&ledger, ws.id, debt.id, 40_000, 40_000, 5).await;

    let overview = ledger.debt_overview(ws.id, debt.id).await.unwrap();
    assert_eq!(overview.remaining.minor(), 60_000);
    assert_eq!(overview.progress_pct, 40);
    assert!(!overview.is_paid_off());
}

#[tokio::test]
async fn overapplication_is_rejected_before_the_write() {
    let (ledger, ws, debt) = ledger_with_debt().await;
    repay(&ledger, ws.id, debt.id, 40_000, 40_000, 5).await;

    // 400.00 already applied; 700.00 exceeds the 600.00 remaining.
    let err = ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Expense, 70_000, day(6))
                .debt(debt.id, 70_000),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::DebtOverapplication {
            requested_minor: 70_000,
            remaining_minor: 60_000,
        }
    );

    // The rejected write left nothing behind.
    let overview = ledger.debt_overview(ws.id, debt.id).await.unwrap();
    assert_eq!(overview.remaining.minor(), 60_000);
}

#[tokio::test]
async fn deleting_the_operation_releases_its_application() {
    let (ledger, ws, debt) = ledger_with_debt().await;
    let op = repay(&ledger, ws.id, debt.id, 40_000, 40_000, 5).await;

    ledger.delete_operation(ws.id, op.id).await.unwrap();
    let remaining = ledger.debt_remaining(ws.id, debt.id).await.unwrap();
    assert_eq!(remaining.minor(), 100_000);
}

#[tokio::test]
async fn applied_amount_cannot_exceed_the_operation_amount() {
    let (ledger, ws, debt) = ledger_with_debt().await;

    let err = ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Expense, 10_000, day(5))
                .debt(debt.id, 20_000),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn partial_application_is_allowed() {
    let (ledger, ws, debt) = ledger_with_debt().await;

    // 300.00 spent, only 250.00 of it against the debt.
    repay(&ledger, ws.id, debt.id, 30_000, 25_000, 5).await;
    let remaining = ledger.debt_remaining(ws.id, debt.id).await.unwrap();
    assert_eq!(remaining.minor(), 75_000);
}

#[tokio::test]
async fn settling_kind_must_match_the_direction() {
    let (ledger, ws, _debt) = ledger_with_debt().await;
    let owed = ledger
        .create_debt(
            ws.id,
            DebtDirection::OwedToMe,
            "Lunch money",
            "Bob",
            5_000,
            day(1),
            None,
            None,
        )
        .await
        .unwrap();

    // A debt owed to me is settled by incoming money, not an expense.
    let err = ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Expense, 5_000, day(2))
                .debt(owed.id, 5_000),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Income, 5_000, day(2))
                .debt(owed.id, 5_000),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn update_excludes_the_operations_own_contribution() {
    let (ledger, ws, debt) = ledger_with_debt().await;
    let op = repay(&ledger, ws.id, debt.id, 100_000, 40_000, 5).await;

    // Raising this operation to the full initial amount is fine: its own
    // 400.00 does not count against the headroom it is replacing.
    ledger
        .update_operation(
            ws.id,
            op.id,
            UpdateOperationCmd {
                debt_applied_minor: Some(100_000),
                ..UpdateOperationCmd::default()
            },
        )
        .await
        .unwrap();

    let overview = ledger.debt_overview(ws.id, debt.id).await.unwrap();
    assert_eq!(overview.remaining.minor(), 0);
    assert_eq!(overview.progress_pct, 100);
    assert!(overview.is_paid_off());
}

#[tokio::test]
async fn paid_off_debts_stay_listed_until_archived() {
    let (ledger, ws, debt) = ledger_with_debt().await;
    repay(&ledger, ws.id, debt.id, 100_000, 100_000, 5).await;

    let listed = ledger.list_debts(ws.id, false).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].is_paid_off());

    ledger.archive_debt(ws.id, debt.id, true).await.unwrap();
    assert!(ledger.list_debts(ws.id, false).await.unwrap().is_empty());
    assert_eq!(ledger.list_debts(ws.id, true).await.unwrap().len(), 1);
}

#[tokio::test]
async fn referenced_debt_cannot_be_deleted() {
    let (ledger, ws, debt) = ledger_with_debt().await;
    let op = repay(&ledger, ws.id, debt.id, 10_000, 10_000, 5).await;

    let err = ledger.delete_debt(ws.id, debt.id).await.unwrap_err();
    assert_eq!(
        err,
        LedgerError::ReferentialIntegrity {
            entity: "debt".to_string(),
            references: 1,
        }
    );

    ledger.delete_operation(ws.id, op.id).await.unwrap();
    ledger.delete_debt(ws.id, debt.id).await.unwrap();
}
