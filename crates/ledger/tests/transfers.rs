use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use ledger::{
    Currency, Ledger, LedgerError, OperationKind, RateSource, RecordOperationCmd,
    RecordTransferCmd, UpdateTransferCmd, Workspace,
};
use migration::MigratorTrait;

async fn ledger_with_accounts() -> (Ledger, DatabaseConnection, Workspace, Uuid, Uuid) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder().database(db.clone()).build();
    let workspace = ledger
        .create_workspace("Main", eur(), "alice")
        .await
        .unwrap();
    let cash = ledger
        .list_accounts(workspace.id)
        .await
        .unwrap()
        .into_iter()
        .find(|a| a.name == "Cash")
        .expect("seeded Cash account missing")
        .id;
    let bank = ledger
        .create_account(workspace.id, "Bank", None)
        .await
        .unwrap()
        .id;
    (ledger, db, workspace, cash, bank)
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

#[tokio::test]
async fn transfer_conserves_the_workspace_total() {
    let (ledger, _db, ws, cash, bank) = ledger_with_accounts().await;

    ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Income, 10_000, day(1))
                .account_id(cash),
        )
        .await
        .unwrap();

    // Move 50.00 from cash to bank.
    ledger
        .record_transfer(RecordTransferCmd::new(
            ws.id, "alice", cash, bank, 5_000,
            day(2),
        ))
        .await
        .unwrap();

    let balances = ledger.balances_for(ws.id).await.unwrap();
    assert_eq!(balances[&cash].minor(), 5_000);
    assert_eq!(balances[&bank].minor(), 5_000);
    let total: i64 = balances.values().map(|m| m.minor()).sum();
    assert_eq!(total, 10_000);
}

#[tokio::test]
async fn transfer_to_the_same_account_is_rejected() {
    let (ledger, _db, ws, cash, _bank) = ledger_with_accounts().await;

    let err = ledger
        .record_transfer(RecordTransferCmd::new(
            ws.id, "alice", cash, cash, 5_000,
            day(2),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn both_legs_share_one_group_and_directions() {
    let (ledger, _db, ws, cash, bank) = ledger_with_accounts().await;

    let pair = ledger
        .record_transfer(RecordTransferCmd::new(
            ws.id, "alice", cash, bank, 2_500,
            day(3),
        ))
        .await
        .unwrap();

    assert_eq!(pair.outgoing.transfer_group_id, pair.incoming.transfer_group_id);
    assert_eq!(pair.outgoing.account_id, Some(cash));
    assert_eq!(pair.incoming.account_id, Some(bank));
    assert_eq!(pair.outgoing.amount_minor, pair.incoming.amount_minor);
    assert_eq!(pair.outgoing.kind, OperationKind::Transfer);
}

#[tokio::test]
async fn deleting_either_leg_deletes_the_pair() {
    let (ledger, _db, ws, cash, bank) = ledger_with_accounts().await;

    ledger
        .record_operation(
            RecordOperationCmd::new(ws.id, "alice", OperationKind::Income, 10_000, day(1))
                .account_id(cash),
        )
        .await
        .unwrap();
    let pair = ledger
        .record_transfer(RecordTransferCmd::new(
            ws.id, "alice", cash, bank, 5_000,
            day(2),
        ))
        .await
        .unwrap();

    // Delete through the incoming leg; the whole group goes.
    ledger.delete_operation(ws.id, pair.incoming.id).await.unwrap();

    let balances = ledger.balances_for(ws.id).await.unwrap();
    assert_eq!(balances[&cash].minor(), 10_000);
    assert_eq!(balances[&bank].minor(), 0);
    assert!(matches!(
        ledger.transfer(ws.id, pair.group_id()).await.unwrap_err(),
        LedgerError::KeyNotFound(_)
    ));
}

#[tokio::test]
async fn cross_currency_legs_book_their_own_amounts() {
    let (ledger, _db, ws, cash, bank) = ledger_with_accounts().await;

    // One EUR->USD observation serves both the cross conversion and the
    // (inverted) USD->EUR base posting of the incoming leg.
    ledger
        .put_rate(ws.id, eur(), usd(), day(10), 1.25, RateSource::Manual)
        .await
        .unwrap();

    let pair = ledger
        .record_transfer(
            RecordTransferCmd::new(ws.id, "alice", cash, bank, 10_000, day(10))
                .to_currency(usd()),
        )
        .await
        .unwrap();

    assert_eq!(pair.outgoing.currency, eur());
    assert_eq!(pair.outgoing.amount_minor, 10_000);
    assert_eq!(pair.outgoing.base_amount_minor, None);

    assert_eq!(pair.incoming.currency, usd());
    assert_eq!(pair.incoming.amount_minor, 12_500);
    // 12_500 USD back to base at 1/1.25.
    assert_eq!(pair.incoming.base_amount_minor, Some(10_000));
}

#[tokio::test]
async fn explicit_cross_rate_wins_over_the_store() {
    let (ledger, _db, ws, cash, bank) = ledger_with_accounts().await;
    ledger
        .put_rate(ws.id, eur(), usd(), day(10), 1.25, RateSource::Manual)
        .await
        .unwrap();

    let pair = ledger
        .record_transfer(
            RecordTransferCmd::new(ws.id, "alice", cash, bank, 10_000, day(10))
                .to_currency(usd())
                .cross_rate(1.10),
        )
        .await
        .unwrap();
    assert_eq!(pair.incoming.amount_minor, 11_000);
}

#[tokio::test]
async fn update_touches_both_legs() {
    let (ledger, _db, ws, cash, bank) = ledger_with_accounts().await;

    let pair = ledger
        .record_transfer(
            RecordTransferCmd::new(ws.id, "alice", cash, bank, 5_000, day(2)).note("rent float"),
        )
        .await
        .unwrap();

    let updated = ledger
        .update_transfer(
            ws.id,
            pair.group_id(),
            UpdateTransferCmd {
                amount_minor: Some(2_000),
                occurred_on: Some(day(4)),
                ..UpdateTransferCmd::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.outgoing.amount_minor, 2_000);
    assert_eq!(updated.incoming.amount_minor, 2_000);
    assert_eq!(updated.outgoing.occurred_on, day(4));
    assert_eq!(updated.incoming.occurred_on, day(4));
    assert_eq!(updated.outgoing.note.as_deref(), Some("rent float"));
}

#[tokio::test]
async fn update_changes_the_destination_currency() {
    let (ledger, _db, ws, cash, bank) = ledger_with_accounts().await;
    ledger
        .put_rate(ws.id, eur(), usd(), day(2), 1.25, RateSource::Manual)
        .await
        .unwrap();

    // Recorded same-currency, then repatched into a cross-currency pair.
    let pair = ledger
        .record_transfer(RecordTransferCmd::new(
            ws.id, "alice", cash, bank, 5_000,
            day(2),
        ))
        .await
        .unwrap();
    assert_eq!(pair.incoming.amount_minor, 5_000);

    let updated = ledger
        .update_transfer(
            ws.id,
            pair.group_id(),
            UpdateTransferCmd {
                to_currency: Some(usd()),
                ..UpdateTransferCmd::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.outgoing.currency, eur());
    assert_eq!(updated.outgoing.amount_minor, 5_000);
    assert_eq!(updated.outgoing.base_amount_minor, None);
    assert_eq!(updated.incoming.currency, usd());
    assert_eq!(updated.incoming.amount_minor, 6_250);
    // 6_250 USD back to base at the inverted observation.
    assert_eq!(updated.incoming.base_amount_minor, Some(5_000));
}

#[tokio::test]
async fn transfer_legs_cannot_be_updated_individually() {
    let (ledger, _db, ws, cash, bank) = ledger_with_accounts().await;
    let pair = ledger
        .record_transfer(RecordTransferCmd::new(
            ws.id, "alice", cash, bank, 5_000,
            day(2),
        ))
        .await
        .unwrap();

    let err = ledger
        .update_operation(ws.id, pair.outgoing.id, ledger::UpdateOperationCmd::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn torn_pair_is_reported_not_repaired() {
    let (ledger, db, ws, cash, bank) = ledger_with_accounts().await;
    let pair = ledger
        .record_transfer(RecordTransferCmd::new(
            ws.id, "alice", cash, bank, 5_000,
            day(2),
        ))
        .await
        .unwrap();

    // Corrupt the store out-of-band: drop one leg.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "DELETE FROM operations WHERE id = ?",
        vec![pair.incoming.id.into()],
    ))
    .await
    .unwrap();

    let err = ledger.transfer(ws.id, pair.group_id()).await.unwrap_err();
    assert!(matches!(err, LedgerError::PartialWrite(_)));
}

#[tokio::test]
async fn deleting_a_torn_leg_removes_the_remnant() {
    let (ledger, db, ws, cash, bank) = ledger_with_accounts().await;
    let pair = ledger
        .record_transfer(RecordTransferCmd::new(
            ws.id, "alice", cash, bank, 5_000,
            day(2),
        ))
        .await
        .unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "DELETE FROM operations WHERE id = ?",
        vec![pair.incoming.id.into()],
    ))
    .await
    .unwrap();

    // The group read still reports corruption, but delete cleans it up.
    ledger.delete_operation(ws.id, pair.outgoing.id).await.unwrap();

    assert!(matches!(
        ledger.transfer(ws.id, pair.group_id()).await.unwrap_err(),
        LedgerError::KeyNotFound(_)
    ));
    let balances = ledger.balances_for(ws.id).await.unwrap();
    assert_eq!(balances[&cash].minor(), 0);
}
