use std::time::Duration;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CategoryInput, Engine, EngineError, MoneyCents, MonthlyRecord, MonthlyRecordUpdate,
    NewMonthlyRecord,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .password_cost(4)
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// A user without the default categories.
async fn bare_user(engine: &Engine, db: &DatabaseConnection, username: &str) -> i64 {
    let user = engine.new_user(username, "password").await.unwrap();
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "DELETE FROM categories WHERE user_id = ?",
        vec![user.id.into()],
    ))
    .await
    .unwrap();
    user.id
}

async fn count(db: &DatabaseConnection, table: &str) -> i64 {
    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap()
}

async fn add_category(
    engine: &Engine,
    user_id: i64,
    name: &str,
    percentage: f64,
    order: i32,
) -> i64 {
    engine
        .new_category(
            user_id,
            &CategoryInput {
                name: name.to_string(),
                percentage,
                display_order: Some(order),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .id
}

async fn scenario_a(engine: &Engine, user_id: i64) -> (MonthlyRecord, [i64; 3]) {
    let housing = add_category(engine, user_id, "Housing", 30.0, 0).await;
    let food = add_category(engine, user_id, "Food", 20.0, 1).await;
    let savings = add_category(engine, user_id, "Savings", 50.0, 2).await;
    let record = engine
        .new_monthly_record(user_id, &month(2025, 1, 100_000))
        .await
        .unwrap();
    (record, [housing, food, savings])
}

fn month(year: i32, month: u32, income: i64) -> NewMonthlyRecord {
    NewMonthlyRecord {
        year,
        month,
        income: MoneyCents::new(income),
        notes: None,
    }
}

fn amounts(record: &MonthlyRecord) -> Vec<i64> {
    record.snapshots.iter().map(|s| s.amount.cents()).collect()
}

fn names(record: &MonthlyRecord) -> Vec<&str> {
    record
        .snapshots
        .iter()
        .map(|s| s.category_name.as_str())
        .collect()
}

async fn tick() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

#[tokio::test]
async fn new_record_snapshots_active_categories() {
    let (engine, db) = engine_with_db().await;
    let user_id = bare_user(&engine, &db, "alice").await;

    let (record, _) = scenario_a(&engine, user_id).await;
    assert_eq!(record.income, MoneyCents::new(100_000));
    assert_eq!(names(&record), vec!["Housing", "Food", "Savings"]);
    assert_eq!(amounts(&record), vec![30_000, 20_000, 50_000]);
    assert!(!record.stale);

    let reloaded = engine.monthly_record(record.id, user_id).await.unwrap();
    assert_eq!(reloaded.snapshots, record.snapshots);
    assert!(!reloaded.stale);
}

#[tokio::test]
async fn regenerate_uses_current_percentages_and_keeps_income() {
    let (engine, db) = engine_with_db().await;
    let user_id = bare_user(&engine, &db, "alice").await;
    let (record, [_, food, savings]) = scenario_a(&engine, user_id).await;

    tick().await;
    for (id, name, percentage, order) in [(savings, "Savings", 40.0, 2), (food, "Food", 30.0, 1)] {
        engine
            .update_category(
                id,
                user_id,
                &CategoryInput {
                    name: name.to_string(),
                    percentage,
                    display_order: Some(order),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let before = engine.monthly_record(record.id, user_id).await.unwrap();
    assert!(before.stale);
    // the stored breakdown is untouched until regeneration
    assert_eq!(amounts(&before), vec![30_000, 20_000, 50_000]);

    tick().await;
    let regenerated = engine.regenerate_snapshots(record.id, user_id).await.unwrap();
    assert_eq!(regenerated.income, MoneyCents::new(100_000));
    assert_eq!(amounts(&regenerated), vec![30_000, 30_000, 40_000]);
    assert!(regenerated.updated_at.is_some());

    let after = engine.monthly_record(record.id, user_id).await.unwrap();
    assert!(!after.stale);
    assert_eq!(after.income, MoneyCents::new(100_000));
}

#[tokio::test]
async fn editing_income_resnapshots_from_current_categories() {
    let (engine, db) = engine_with_db().await;
    let user_id = bare_user(&engine, &db, "alice").await;
    let (record, _) = scenario_a(&engine, user_id).await;

    tick().await;
    add_category(&engine, user_id, "Leisure", 10.0, 3).await;

    let updated = engine
        .update_monthly_record(
            record.id,
            user_id,
            &MonthlyRecordUpdate {
                income: MoneyCents::new(200_000),
                notes: Some("bonus".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.income, MoneyCents::new(200_000));
    assert_eq!(updated.notes.as_deref(), Some("bonus"));
    assert_eq!(names(&updated), vec!["Housing", "Food", "Savings", "Leisure"]);
    assert_eq!(amounts(&updated), vec![60_000, 40_000, 100_000, 20_000]);
    // percentages add up to 110: the breakdown exceeds the income
    assert_eq!(updated.allocated().unwrap(), MoneyCents::new(220_000));
    assert_eq!(count(&db, "category_snapshots").await, 4);
}

#[tokio::test]
async fn snapshots_survive_category_changes() {
    let (engine, db) = engine_with_db().await;
    let user_id = bare_user(&engine, &db, "alice").await;
    let (record, [housing, _, _]) = scenario_a(&engine, user_id).await;

    tick().await;
    engine.delete_category(housing, user_id).await.unwrap();

    let reloaded = engine.monthly_record(record.id, user_id).await.unwrap();
    assert_eq!(names(&reloaded), vec!["Housing", "Food", "Savings"]);
    assert_eq!(amounts(&reloaded), vec![30_000, 20_000, 50_000]);
}

#[tokio::test]
async fn inactive_categories_are_not_snapshotted() {
    let (engine, db) = engine_with_db().await;
    let user_id = bare_user(&engine, &db, "alice").await;
    add_category(&engine, user_id, "Housing", 60.0, 0).await;
    engine
        .new_category(
            user_id,
            &CategoryInput {
                name: "Paused".to_string(),
                percentage: 40.0,
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let record = engine
        .new_monthly_record(user_id, &month(2025, 2, 50_000))
        .await
        .unwrap();
    assert_eq!(names(&record), vec!["Housing"]);
    assert_eq!(amounts(&record), vec![30_000]);

    let overview = engine.category_overview(user_id).await.unwrap();
    assert_eq!(overview.categories.len(), 2);
    assert!((overview.total_percentage - 60.0).abs() < 1e-9);
    assert!(!overview.balanced);
}

#[tokio::test]
async fn duplicate_month_is_a_conflict() {
    let (engine, db) = engine_with_db().await;
    let user_id = bare_user(&engine, &db, "alice").await;
    scenario_a(&engine, user_id).await;

    let err = engine
        .new_monthly_record(user_id, &month(2025, 1, 5_000))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
    assert_eq!(count(&db, "monthly_records").await, 1);

    // the same month is free for another user
    let bob = engine.new_user("bob", "password").await.unwrap();
    engine
        .new_monthly_record(bob.id, &month(2025, 1, 5_000))
        .await
        .unwrap();
}

#[tokio::test]
async fn creating_without_active_categories_fails() {
    let (engine, db) = engine_with_db().await;
    let user_id = bare_user(&engine, &db, "alice").await;

    let err = engine
        .new_monthly_record(user_id, &month(2025, 1, 100_000))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Precondition(_)));
    assert_eq!(count(&db, "monthly_records").await, 0);
}

#[tokio::test]
async fn editing_without_categories_clears_snapshots() {
    let (engine, db) = engine_with_db().await;
    let user_id = bare_user(&engine, &db, "alice").await;
    let (record, ids) = scenario_a(&engine, user_id).await;
    for id in ids {
        engine.delete_category(id, user_id).await.unwrap();
    }

    let updated = engine
        .update_monthly_record(
            record.id,
            user_id,
            &MonthlyRecordUpdate {
                income: MoneyCents::new(120_000),
                notes: None,
            },
        )
        .await
        .unwrap();
    assert!(updated.snapshots.is_empty());
    assert_eq!(updated.income, MoneyCents::new(120_000));

    let err = engine
        .regenerate_snapshots(record.id, user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Precondition(_)));
}

#[tokio::test]
async fn deleting_a_record_leaves_no_snapshots() {
    let (engine, db) = engine_with_db().await;
    let user_id = bare_user(&engine, &db, "alice").await;
    let (record, _) = scenario_a(&engine, user_id).await;
    assert_eq!(count(&db, "category_snapshots").await, 3);

    engine
        .delete_monthly_record(record.id, user_id)
        .await
        .unwrap();
    assert_eq!(count(&db, "monthly_records").await, 0);
    assert_eq!(count(&db, "category_snapshots").await, 0);

    let err = engine.monthly_record(record.id, user_id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn records_of_other_users_are_not_found() {
    let (engine, db) = engine_with_db().await;
    let alice = bare_user(&engine, &db, "alice").await;
    let (record, [housing, _, _]) = scenario_a(&engine, alice).await;
    let bob = engine.new_user("bob", "password").await.unwrap().id;

    let update = MonthlyRecordUpdate {
        income: MoneyCents::new(1),
        notes: None,
    };
    let errors = [
        engine.monthly_record(record.id, bob).await.unwrap_err(),
        engine
            .update_monthly_record(record.id, bob, &update)
            .await
            .unwrap_err(),
        engine.regenerate_snapshots(record.id, bob).await.unwrap_err(),
        engine.delete_monthly_record(record.id, bob).await.unwrap_err(),
        engine.delete_category(housing, bob).await.unwrap_err(),
    ];
    for err in errors {
        assert!(matches!(err, EngineError::KeyNotFound(_)), "{err:?}");
    }

    // ownership is checked before the input
    let invalid = MonthlyRecordUpdate {
        income: MoneyCents::ZERO,
        notes: None,
    };
    let errors = [
        engine
            .update_monthly_record(record.id, bob, &invalid)
            .await
            .unwrap_err(),
        engine
            .update_category(
                housing,
                bob,
                &CategoryInput {
                    name: String::new(),
                    percentage: 0.0,
                    ..Default::default()
                },
            )
            .await
            .unwrap_err(),
    ];
    for err in errors {
        assert!(matches!(err, EngineError::KeyNotFound(_)), "{err:?}");
    }

    let untouched = engine.monthly_record(record.id, alice).await.unwrap();
    assert_eq!(untouched.income, MoneyCents::new(100_000));
    assert!(engine.monthly_records(bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn history_is_newest_first_with_stats() {
    let (engine, db) = engine_with_db().await;
    let user_id = bare_user(&engine, &db, "alice").await;
    scenario_a(&engine, user_id).await;
    for (y, m, income) in [(2024, 12, 150_000), (2025, 3, 90_000)] {
        engine
            .new_monthly_record(user_id, &month(y, m, income))
            .await
            .unwrap();
    }

    let history = engine.history(user_id).await.unwrap();
    let months: Vec<(i32, u32)> = history.records.iter().map(|r| (r.year, r.month)).collect();
    assert_eq!(months, vec![(2025, 3), (2025, 1), (2024, 12)]);
    assert_eq!(history.stats.months, 3);
    assert_eq!(history.stats.total, MoneyCents::new(340_000));
    assert_eq!(history.stats.average, MoneyCents::new(113_333));
    assert_eq!(history.stats.best, MoneyCents::new(150_000));
}

#[tokio::test]
async fn invalid_record_input_is_rejected() {
    let (engine, db) = engine_with_db().await;
    let user_id = bare_user(&engine, &db, "alice").await;
    scenario_a(&engine, user_id).await;

    let err = engine
        .new_monthly_record(user_id, &month(2025, 4, 0))
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("income"));

    let err = engine
        .new_monthly_record(user_id, &month(2019, 4, 100))
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("year"));

    let err = engine
        .new_monthly_record(user_id, &month(2025, 4, i64::MAX))
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("income"));
    assert_eq!(count(&db, "monthly_records").await, 1);
}

#[tokio::test]
async fn history_reports_overflowing_totals() {
    let (engine, db) = engine_with_db().await;
    let user_id = bare_user(&engine, &db, "alice").await;
    for month in [1i32, 2] {
        db.execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO monthly_records (user_id, year, month, income_minor, notes, created_at) \
             VALUES (?, 2025, ?, ?, NULL, '2025-06-01T00:00:00+00:00')",
            vec![user_id.into(), month.into(), i64::MAX.into()],
        ))
        .await
        .unwrap();
    }

    let err = engine.history(user_id).await.unwrap_err();
    assert_eq!(err.field(), Some("amount"));
    // single records stay readable
    assert_eq!(engine.monthly_records(user_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn new_users_get_default_categories() {
    let (engine, _db) = engine_with_db().await;
    let user = engine.new_user("alice", "password").await.unwrap();

    let overview = engine.category_overview(user.id).await.unwrap();
    let names: Vec<&str> = overview
        .categories
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Housing", "Food", "Transport", "Leisure", "Savings", "Other"]
    );
    assert!(overview.balanced);

    let err = engine.new_user("alice", "password").await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn authentication_and_password_change() {
    let (engine, _db) = engine_with_db().await;
    let user = engine.new_user("alice", "password").await.unwrap();

    assert_eq!(engine.authenticate("alice", "password").await.unwrap(), user);
    assert!(matches!(
        engine.authenticate("alice", "wrong").await,
        Err(EngineError::InvalidCredentials(_))
    ));
    assert!(matches!(
        engine.authenticate("nobody", "password").await,
        Err(EngineError::InvalidCredentials(_))
    ));

    let err = engine
        .change_password(user.id, "password", "short")
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("password"));
    let err = engine
        .change_password(user.id, "wrong-one", "new-secret")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCredentials(_)));

    engine
        .change_password(user.id, "password", "new-secret")
        .await
        .unwrap();
    assert!(engine.authenticate("alice", "password").await.is_err());
    assert!(engine.authenticate("alice", "new-secret").await.is_ok());

    engine.reset_password("alice", "another1").await.unwrap();
    assert!(engine.authenticate("alice", "another1").await.is_ok());
}

#[tokio::test]
async fn passwords_are_stored_as_bcrypt_hashes() {
    let (engine, db) = engine_with_db().await;
    engine.new_user("alice", "password").await.unwrap();

    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            "SELECT password_hash FROM users WHERE username = 'alice'",
        ))
        .await
        .unwrap()
        .unwrap();
    let stored: String = row.try_get("", "password_hash").unwrap();
    assert!(stored.starts_with("$2b$04$"), "{stored}");
    assert!(!stored.contains("password"));
}

#[tokio::test]
async fn builder_rejects_unusable_password_cost() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    for cost in [3, 32] {
        let err = Engine::builder()
            .database(db.clone())
            .password_cost(cost)
            .build()
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("password_cost"));
    }
}
