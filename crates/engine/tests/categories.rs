use sea_orm::Database;

use engine::{Engine, EngineError};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

#[tokio::test]
async fn categories_keep_display_attributes_and_name_order() {
    let engine = engine_with_db().await;

    engine
        .new_category("Groceries", Some("🛒"), Some("#E57373"))
        .await
        .unwrap();
    engine
        .new_category("Bills", Some("💡"), Some("4fc3f7"))
        .await
        .unwrap();

    let categories = engine.categories().await.unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].name, "Bills");
    assert_eq!(categories[0].emoji, "💡");
    assert_eq!(categories[0].color, "#4fc3f7");
    assert_eq!(categories[1].name, "Groceries");
    assert_eq!(categories[1].color, "#e57373");
}

#[tokio::test]
async fn update_changes_name_and_attributes() {
    let engine = engine_with_db().await;
    let id = engine.new_category("Food", None, None).await.unwrap();

    engine
        .update_category(id, "Eating out", Some("🍕"), Some("#ffb74d"))
        .await
        .unwrap();

    let categories = engine.categories().await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Eating out");
    assert_eq!(categories[0].emoji, "🍕");

    // Renaming onto another category's key is refused.
    engine.new_category("Travel", None, None).await.unwrap();
    let err = engine
        .update_category(id, " travel ", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn resolve_finds_or_creates_by_normalized_name() {
    let engine = engine_with_db().await;
    let id = engine.new_category("Groceries", None, None).await.unwrap();

    // Same key, different case/spacing: resolves to the existing category.
    let resolved = engine.resolve_category("  GROCERIES ").await.unwrap();
    assert_eq!(resolved, id);

    // Unknown name: created with default attributes.
    let fresh = engine.resolve_category("Pets").await.unwrap();
    assert_ne!(fresh, id);
    let categories = engine.categories().await.unwrap();
    assert_eq!(categories.len(), 2);

    let err = engine.resolve_category("   ").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));
}

#[tokio::test]
async fn delete_removes_an_unused_category() {
    let engine = engine_with_db().await;
    let id = engine.new_category("Fleeting", None, None).await.unwrap();

    engine.delete_category(id).await.unwrap();
    assert!(engine.categories().await.unwrap().is_empty());

    let err = engine.delete_category(id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn account_groups_list_ordered_and_accounts_rename() {
    let engine = engine_with_db().await;

    let banks = engine.new_account_group("Banks").await.unwrap();
    engine.new_account_group("Cash").await.unwrap();

    let groups = engine.account_groups().await.unwrap();
    let names: Vec<&str> = groups.iter().map(|group| group.name.as_str()).collect();
    assert_eq!(names, ["Banks", "Cash"]);

    let account_id = engine.new_account(banks, "Cheking", 0).await.unwrap();
    engine.rename_account(account_id, "Checking").await.unwrap();

    let accounts = engine.accounts().await.unwrap();
    assert_eq!(accounts[0].name, "Checking");
    assert_eq!(accounts[0].group_name, "Banks");
}
