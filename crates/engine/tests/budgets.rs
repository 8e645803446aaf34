use chrono::{TimeZone, Utc};
use sea_orm::Database;
use uuid::Uuid;

use engine::{Engine, EngineError, MonthPeriod, NewTransaction, TransactionKind};
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

async fn seed_expense(
    engine: &Engine,
    category_id: Uuid,
    account_id: Uuid,
    amount_minor: i64,
    year: i32,
    month: u32,
    day: u32,
) {
    engine
        .add_transaction(NewTransaction {
            kind: TransactionKind::Expense,
            amount_minor,
            note: None,
            occurred_at: Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap(),
            category_id,
            account_id,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn creating_a_budget_seeds_twelve_entries_with_the_initial_amount() {
    let engine = engine_with_db().await;
    let category_id = engine.new_category("Groceries", None, None).await.unwrap();

    let budget_id = engine.new_budget(category_id, 2026, 300_00).await.unwrap();

    let entries = engine.budget_entries(budget_id, 2026).await.unwrap();
    assert_eq!(entries.len(), 12);
    let months: Vec<u32> = entries.iter().map(|entry| entry.month).collect();
    assert_eq!(months, (1..=12).collect::<Vec<u32>>());
    assert!(entries.iter().all(|entry| entry.amount_minor == 300_00));
    assert!(entries.iter().all(|entry| entry.year == 2026));
}

#[tokio::test]
async fn a_category_gets_at_most_one_budget() {
    let engine = engine_with_db().await;
    let category_id = engine.new_category("Groceries", None, None).await.unwrap();

    engine.new_budget(category_id, 2026, 300_00).await.unwrap();
    let err = engine
        .new_budget(category_id, 2027, 100_00)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn entries_are_individually_editable() {
    let engine = engine_with_db().await;
    let category_id = engine.new_category("Groceries", None, None).await.unwrap();
    let budget_id = engine.new_budget(category_id, 2026, 300_00).await.unwrap();

    engine
        .set_budget_entry(budget_id, 2026, 8, 450_00)
        .await
        .unwrap();

    let entries = engine.budget_entries(budget_id, 2026).await.unwrap();
    for entry in entries {
        let expected = if entry.month == 8 { 450_00 } else { 300_00 };
        assert_eq!(entry.amount_minor, expected);
    }
}

#[tokio::test]
async fn editing_an_unseeded_month_is_an_error() {
    let engine = engine_with_db().await;
    let category_id = engine.new_category("Groceries", None, None).await.unwrap();
    let budget_id = engine.new_budget(category_id, 2026, 300_00).await.unwrap();

    let err = engine
        .set_budget_entry(budget_id, 2027, 1, 100_00)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .set_budget_entry(budget_id, 2026, 13, 100_00)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidPeriod(_)));
}

#[tokio::test]
async fn seeding_another_year_adds_twelve_more_entries_once() {
    let engine = engine_with_db().await;
    let category_id = engine.new_category("Groceries", None, None).await.unwrap();
    let budget_id = engine.new_budget(category_id, 2026, 300_00).await.unwrap();

    engine
        .seed_budget_year(budget_id, 2027, 320_00)
        .await
        .unwrap();

    assert_eq!(engine.budget_entries(budget_id, 2027).await.unwrap().len(), 12);
    let err = engine
        .seed_budget_year(budget_id, 2027, 320_00)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn overview_reports_zero_spending_for_untouched_budgets() {
    let engine = engine_with_db().await;
    let groceries = engine.new_category("Groceries", None, None).await.unwrap();
    let fun = engine.new_category("Fun", None, None).await.unwrap();
    let group_id = engine.new_account_group("Banks").await.unwrap();
    let account_id = engine.new_account(group_id, "Checking", 0).await.unwrap();

    engine.new_budget(groceries, 2026, 300_00).await.unwrap();
    engine.new_budget(fun, 2026, 100_00).await.unwrap();

    seed_expense(&engine, groceries, account_id, 80_00, 2026, 3, 10).await;
    seed_expense(&engine, groceries, account_id, 20_00, 2026, 3, 20).await;
    // Spending outside March must not count.
    seed_expense(&engine, groceries, account_id, 999_00, 2026, 4, 1).await;

    let march = MonthPeriod::new(2026, 3).unwrap();
    let overview = engine.budget_overview(march).await.unwrap();

    assert_eq!(overview.lines.len(), 2);
    let fun_line = overview
        .lines
        .iter()
        .find(|line| line.category_name == "Fun")
        .unwrap();
    assert_eq!(fun_line.budget_minor, 100_00);
    assert_eq!(fun_line.spent_minor, 0);

    let groceries_line = overview
        .lines
        .iter()
        .find(|line| line.category_name == "Groceries")
        .unwrap();
    assert_eq!(groceries_line.spent_minor, 100_00);
}

#[tokio::test]
async fn overview_totals_are_the_sum_of_their_lines() {
    let engine = engine_with_db().await;
    let group_id = engine.new_account_group("Banks").await.unwrap();
    let account_id = engine.new_account(group_id, "Checking", 0).await.unwrap();

    let mut categories = Vec::new();
    for (name, budget_minor) in [("Groceries", 300_00), ("Fun", 100_00), ("Rent", 700_00)] {
        let category_id = engine.new_category(name, None, None).await.unwrap();
        engine
            .new_budget(category_id, 2026, budget_minor)
            .await
            .unwrap();
        categories.push(category_id);
    }

    seed_expense(&engine, categories[0], account_id, 120_00, 2026, 5, 3).await;
    seed_expense(&engine, categories[1], account_id, 40_00, 2026, 5, 9).await;
    seed_expense(&engine, categories[1], account_id, 15_50, 2026, 5, 21).await;

    let may = MonthPeriod::new(2026, 5).unwrap();
    let overview = engine.budget_overview(may).await.unwrap();

    let line_budget_sum: i64 = overview.lines.iter().map(|line| line.budget_minor).sum();
    let line_spent_sum: i64 = overview.lines.iter().map(|line| line.spent_minor).sum();
    assert_eq!(overview.total_budget_minor, line_budget_sum);
    assert_eq!(overview.total_spent_minor, line_spent_sum);
    assert_eq!(overview.total_budget_minor, 1100_00);
    assert_eq!(overview.total_spent_minor, 175_50);
}

#[tokio::test]
async fn overview_skips_years_that_were_never_seeded() {
    let engine = engine_with_db().await;
    let category_id = engine.new_category("Groceries", None, None).await.unwrap();
    engine.new_budget(category_id, 2026, 300_00).await.unwrap();

    let far_future = MonthPeriod::new(2030, 1).unwrap();
    let overview = engine.budget_overview(far_future).await.unwrap();
    assert!(overview.lines.is_empty());
    assert_eq!(overview.total_budget_minor, 0);
}

#[tokio::test]
async fn deleting_a_budget_removes_its_entries() {
    let engine = engine_with_db().await;
    let category_id = engine.new_category("Groceries", None, None).await.unwrap();
    let budget_id = engine.new_budget(category_id, 2026, 300_00).await.unwrap();

    engine.delete_budget(budget_id).await.unwrap();

    assert!(engine.budgets().await.unwrap().is_empty());
    assert!(engine.budget_entries(budget_id, 2026).await.unwrap().is_empty());

    // The category is deletable again once the budget is gone.
    engine.delete_category(category_id).await.unwrap();
}

#[tokio::test]
async fn negative_budget_amounts_are_rejected() {
    let engine = engine_with_db().await;
    let category_id = engine.new_category("Groceries", None, None).await.unwrap();

    let err = engine.new_budget(category_id, 2026, -1).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert!(engine.budgets().await.unwrap().is_empty());
}
