use chrono::{TimeZone, Utc};
use sea_orm::Database;
use uuid::Uuid;

use engine::{Engine, MonthPeriod, NewTransaction, TransactionKind};
use migration::MigratorTrait;

const ROME: chrono_tz::Tz = chrono_tz::Europe::Rome;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder()
        .database(db)
        .timezone(ROME)
        .build()
        .await
        .unwrap()
}

struct Fixture {
    engine: Engine,
    account_id: Uuid,
}

impl Fixture {
    async fn new() -> Self {
        let engine = engine_with_db().await;
        let group_id = engine.new_account_group("Banks").await.unwrap();
        let account_id = engine.new_account(group_id, "Checking", 0).await.unwrap();
        Self { engine, account_id }
    }

    async fn category(&self, name: &str) -> Uuid {
        self.engine.new_category(name, None, None).await.unwrap()
    }

    async fn record(
        &self,
        kind: TransactionKind,
        category_id: Uuid,
        amount_minor: i64,
        year: i32,
        month: u32,
        day: u32,
    ) {
        self.engine
            .add_transaction(NewTransaction {
                kind,
                amount_minor,
                note: None,
                occurred_at: Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap(),
                category_id,
                account_id: self.account_id,
            })
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn shares_sum_to_one_and_sort_descending() {
    let fixture = Fixture::new().await;
    let groceries = fixture.category("Groceries").await;
    let fun = fixture.category("Fun").await;
    let rent = fixture.category("Rent").await;

    fixture
        .record(TransactionKind::Expense, groceries, 100_00, 2026, 3, 4)
        .await;
    fixture
        .record(TransactionKind::Expense, fun, 50_00, 2026, 3, 9)
        .await;
    fixture
        .record(TransactionKind::Expense, rent, 250_00, 2026, 3, 1)
        .await;

    let march = MonthPeriod::new(2026, 3).unwrap();
    let shares = fixture
        .engine
        .analytics(march, TransactionKind::Expense)
        .await
        .unwrap();

    assert_eq!(shares.len(), 3);
    let total: f64 = shares.iter().map(|share| share.share).sum();
    assert!((total - 1.0).abs() < 1e-9);

    let names: Vec<&str> = shares
        .iter()
        .map(|share| share.category_name.as_str())
        .collect();
    assert_eq!(names, ["Rent", "Groceries", "Fun"]);
    assert!((shares[0].share - 0.625).abs() < 1e-9);
}

#[tokio::test]
async fn breakdown_is_scoped_to_kind_and_month() {
    let fixture = Fixture::new().await;
    let salary = fixture.category("Salary").await;
    let groceries = fixture.category("Groceries").await;

    fixture
        .record(TransactionKind::Income, salary, 2000_00, 2026, 3, 1)
        .await;
    fixture
        .record(TransactionKind::Expense, groceries, 100_00, 2026, 3, 10)
        .await;
    fixture
        .record(TransactionKind::Expense, groceries, 70_00, 2026, 4, 10)
        .await;

    let march = MonthPeriod::new(2026, 3).unwrap();

    let expenses = fixture
        .engine
        .analytics(march, TransactionKind::Expense)
        .await
        .unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].category_name, "Groceries");
    assert_eq!(expenses[0].total_minor, 100_00);
    assert!((expenses[0].share - 1.0).abs() < 1e-9);

    let income = fixture
        .engine
        .analytics(march, TransactionKind::Income)
        .await
        .unwrap();
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].category_name, "Salary");
}

#[tokio::test]
async fn empty_month_yields_empty_breakdown() {
    let fixture = Fixture::new().await;
    let march = MonthPeriod::new(2026, 3).unwrap();
    let shares = fixture
        .engine
        .analytics(march, TransactionKind::Expense)
        .await
        .unwrap();
    assert!(shares.is_empty());
}

#[tokio::test]
async fn monthly_summary_folds_income_and_expenses() {
    let fixture = Fixture::new().await;
    let salary = fixture.category("Salary").await;
    let groceries = fixture.category("Groceries").await;

    fixture
        .record(TransactionKind::Income, salary, 2000_00, 2026, 3, 1)
        .await;
    fixture
        .record(TransactionKind::Expense, groceries, 350_00, 2026, 3, 12)
        .await;
    fixture
        .record(TransactionKind::Expense, groceries, 150_00, 2026, 3, 25)
        .await;

    let march = MonthPeriod::new(2026, 3).unwrap();
    let summary = fixture.engine.monthly_summary(march).await.unwrap();

    assert_eq!(summary.income_minor, 2000_00);
    assert_eq!(summary.expenses_minor, 500_00);
    assert_eq!(summary.net_minor(), 1500_00);
}

#[tokio::test]
async fn trend_buckets_months_in_local_time() {
    let fixture = Fixture::new().await;
    let groceries = fixture.category("Groceries").await;

    fixture
        .record(TransactionKind::Expense, groceries, 10_00, 2026, 1, 15)
        .await;
    fixture
        .record(TransactionKind::Expense, groceries, 20_00, 2026, 3, 15)
        .await;
    // 2026-02-28 23:30 UTC is already March 1st in Europe/Rome.
    fixture
        .engine
        .add_transaction(NewTransaction {
            kind: TransactionKind::Expense,
            amount_minor: 5_00,
            note: None,
            occurred_at: Utc.with_ymd_and_hms(2026, 2, 28, 23, 30, 0).unwrap(),
            category_id: groceries,
            account_id: fixture.account_id,
        })
        .await
        .unwrap();

    let march = MonthPeriod::new(2026, 3).unwrap();
    let trend = fixture.engine.monthly_trend(march, 3).await.unwrap();

    assert_eq!(trend.len(), 3);
    assert_eq!(trend[0].period, MonthPeriod::new(2026, 1).unwrap());
    assert_eq!(trend[0].expenses_minor, 10_00);
    // February is empty: the late-night UTC expense belongs to March locally.
    assert_eq!(trend[1].period, MonthPeriod::new(2026, 2).unwrap());
    assert_eq!(trend[1].expenses_minor, 0);
    assert_eq!(trend[2].period, march);
    assert_eq!(trend[2].expenses_minor, 25_00);
}
