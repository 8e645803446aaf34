use chrono::{TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{Engine, EngineError, MonthPeriod, NewTransaction, TransactionKind};
use migration::MigratorTrait;

const ROME: chrono_tz::Tz = chrono_tz::Europe::Rome;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .timezone(ROME)
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn seed_account(engine: &Engine, opening_minor: i64) -> Uuid {
    let group_id = engine.new_account_group("Banks").await.unwrap();
    engine
        .new_account(group_id, "Checking", opening_minor)
        .await
        .unwrap()
}

async fn seed_category(engine: &Engine, name: &str) -> Uuid {
    engine.new_category(name, None, None).await.unwrap()
}

fn new_tx(
    kind: TransactionKind,
    amount_minor: i64,
    category_id: Uuid,
    account_id: Uuid,
    occurred_at: chrono::DateTime<Utc>,
) -> NewTransaction {
    NewTransaction {
        kind,
        amount_minor,
        note: None,
        occurred_at,
        category_id,
        account_id,
    }
}

#[tokio::test]
async fn income_and_expense_move_the_account_balance() {
    let (engine, _db) = engine_with_db().await;
    let account_id = seed_account(&engine, 10_00).await;
    let category_id = seed_category(&engine, "Salary").await;

    engine
        .add_transaction(new_tx(
            TransactionKind::Income,
            100_00,
            category_id,
            account_id,
            Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap(),
        ))
        .await
        .unwrap();
    engine
        .add_transaction(new_tx(
            TransactionKind::Expense,
            30_00,
            category_id,
            account_id,
            Utc.with_ymd_and_hms(2026, 3, 6, 12, 0, 0).unwrap(),
        ))
        .await
        .unwrap();

    let accounts = engine.accounts().await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].balance_minor, 10_00 + 100_00 - 30_00);
}

#[tokio::test]
async fn listing_filters_by_month_window_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let account_id = seed_account(&engine, 0).await;
    let category_id = seed_category(&engine, "Groceries").await;

    // 2026-02-28 23:30 UTC is already March 1st in Europe/Rome.
    let in_march_by_tz = Utc.with_ymd_and_hms(2026, 2, 28, 23, 30, 0).unwrap();
    let mid_march = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
    let in_april = Utc.with_ymd_and_hms(2026, 4, 2, 12, 0, 0).unwrap();

    for occurred_at in [in_march_by_tz, mid_march, in_april] {
        engine
            .add_transaction(new_tx(
                TransactionKind::Expense,
                10_00,
                category_id,
                account_id,
                occurred_at,
            ))
            .await
            .unwrap();
    }

    let march = MonthPeriod::new(2026, 3).unwrap();
    let listed = engine.transactions(march).await.unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].occurred_at, mid_march);
    assert_eq!(listed[1].occurred_at, in_march_by_tz);
    assert_eq!(listed[0].category_name, "Groceries");
    assert_eq!(listed[0].account_name, "Checking");
}

#[tokio::test]
async fn update_rebalances_old_and_new_account() {
    let (engine, _db) = engine_with_db().await;
    let group_id = engine.new_account_group("Banks").await.unwrap();
    let checking = engine.new_account(group_id, "Checking", 0).await.unwrap();
    let savings = engine.new_account(group_id, "Savings", 0).await.unwrap();
    let category_id = seed_category(&engine, "Rent").await;

    let occurred_at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    let tx_id = engine
        .add_transaction(new_tx(
            TransactionKind::Expense,
            500_00,
            category_id,
            checking,
            occurred_at,
        ))
        .await
        .unwrap();

    engine
        .update_transaction(
            tx_id,
            new_tx(
                TransactionKind::Expense,
                450_00,
                category_id,
                savings,
                occurred_at,
            ),
        )
        .await
        .unwrap();

    let accounts = engine.accounts().await.unwrap();
    let checking_balance = accounts
        .iter()
        .find(|a| a.name == "Checking")
        .unwrap()
        .balance_minor;
    let savings_balance = accounts
        .iter()
        .find(|a| a.name == "Savings")
        .unwrap()
        .balance_minor;
    assert_eq!(checking_balance, 0);
    assert_eq!(savings_balance, -450_00);
}

#[tokio::test]
async fn delete_restores_the_account_balance() {
    let (engine, _db) = engine_with_db().await;
    let account_id = seed_account(&engine, 0).await;
    let category_id = seed_category(&engine, "Fun").await;

    let tx_id = engine
        .add_transaction(new_tx(
            TransactionKind::Expense,
            25_00,
            category_id,
            account_id,
            Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap(),
        ))
        .await
        .unwrap();

    engine.delete_transaction(tx_id).await.unwrap();

    let accounts = engine.accounts().await.unwrap();
    assert_eq!(accounts[0].balance_minor, 0);
    let march = MonthPeriod::new(2026, 3).unwrap();
    assert!(engine.transactions(march).await.unwrap().is_empty());
}

#[tokio::test]
async fn rejects_invalid_amount_and_missing_references() {
    let (engine, _db) = engine_with_db().await;
    let account_id = seed_account(&engine, 0).await;
    let category_id = seed_category(&engine, "Misc").await;
    let occurred_at = Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap();

    let err = engine
        .add_transaction(new_tx(
            TransactionKind::Expense,
            0,
            category_id,
            account_id,
            occurred_at,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .add_transaction(new_tx(
            TransactionKind::Expense,
            10_00,
            Uuid::new_v4(),
            account_id,
            occurred_at,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .add_transaction(new_tx(
            TransactionKind::Expense,
            10_00,
            category_id,
            Uuid::new_v4(),
            occurred_at,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    // Nothing was written.
    let march = MonthPeriod::new(2026, 3).unwrap();
    assert!(engine.transactions(march).await.unwrap().is_empty());
    assert_eq!(engine.accounts().await.unwrap()[0].balance_minor, 0);
}

#[tokio::test]
async fn delete_account_refused_while_referenced() {
    let (engine, _db) = engine_with_db().await;
    let account_id = seed_account(&engine, 0).await;
    let category_id = seed_category(&engine, "Misc").await;

    engine
        .add_transaction(new_tx(
            TransactionKind::Expense,
            10_00,
            category_id,
            account_id,
            Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap(),
        ))
        .await
        .unwrap();

    let err = engine.delete_account(account_id).await.unwrap_err();
    assert!(matches!(err, EngineError::InUse(_)));

    let err = engine.delete_category(category_id).await.unwrap_err();
    assert!(matches!(err, EngineError::InUse(_)));
}

#[tokio::test]
async fn recompute_balances_repairs_drift() {
    let (engine, db) = engine_with_db().await;
    let account_id = seed_account(&engine, 5_00).await;
    let category_id = seed_category(&engine, "Misc").await;

    engine
        .add_transaction(new_tx(
            TransactionKind::Income,
            20_00,
            category_id,
            account_id,
            Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap(),
        ))
        .await
        .unwrap();

    // Corrupt the denormalized balance behind the engine's back.
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE accounts SET balance_minor = 0 WHERE id = ?",
        vec![account_id.to_string().into()],
    ))
    .await
    .unwrap();

    engine.recompute_balances().await.unwrap();

    let accounts = engine.accounts().await.unwrap();
    assert_eq!(accounts[0].balance_minor, 25_00);
}

#[tokio::test]
async fn duplicate_names_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let group_id = engine.new_account_group("Banks").await.unwrap();
    engine.new_account(group_id, "Checking", 0).await.unwrap();

    let err = engine
        .new_account(group_id, "  checking ", 0)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    engine.new_category("Groceries", None, None).await.unwrap();
    let err = engine
        .new_category("GROCERIES", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}
