use sea_orm::{Database, DatabaseConnection};

use engine::{
    EmployeeInfo, EngineError, ExpensePatch, MoneyCents, NewExpense, PeriodKey, PeriodStore,
    SalaryConfiguration, SalaryField, YearlyRollup,
    storage::{DatabaseProvider, FileProvider, MemoryProvider, SnapshotKey, SnapshotProvider},
};
use migration::MigratorTrait;
use uuid::Uuid;

fn period(raw: &str) -> PeriodKey {
    raw.parse().unwrap()
}

async fn store_with(provider: MemoryProvider, seed: bool) -> PeriodStore<MemoryProvider> {
    PeriodStore::builder()
        .provider(provider)
        .default_period(period("2024-03"))
        .seed_defaults(seed)
        .build()
        .await
        .unwrap()
}

async fn database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

#[tokio::test]
async fn builder_requires_a_provider() {
    let err = PeriodStore::<MemoryProvider>::builder()
        .build()
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::MissingProvider);
}

#[tokio::test]
async fn first_launch_seeds_the_current_period_without_writing() {
    let provider = MemoryProvider::default();
    let store = store_with(provider.clone(), true).await;

    assert_eq!(store.current_period(), period("2024-03"));
    assert_eq!(store.available_periods(), vec![period("2024-03")]);
    assert_eq!(store.current_expenses().len(), 7);
    assert!(provider.is_empty());

    let dashboard = store.dashboard();
    assert_eq!(dashboard.period_totals.total_expenses, MoneyCents::from_major(2860));
    assert_eq!(dashboard.period_totals.total_savings, MoneyCents::from_major(1000));
    assert_eq!(dashboard.salary.net_pay, MoneyCents::ZERO);
    assert_eq!(dashboard.summary.savings_rate, 0.0);
}

#[tokio::test]
async fn seeding_can_be_disabled() {
    let store = store_with(MemoryProvider::default(), false).await;
    assert!(store.available_periods().is_empty());
    assert!(store.current_expenses().is_empty());
}

#[tokio::test]
async fn mutations_survive_a_restart() {
    let provider = MemoryProvider::default();
    let mut store = store_with(provider.clone(), false).await;

    store
        .update_employee(EmployeeInfo {
            name: "Ada".to_string(),
            ..EmployeeInfo::default()
        })
        .await;
    store
        .set_salary_field(SalaryField::BasicSalary, MoneyCents::from_major(5000))
        .await
        .unwrap();
    store
        .set_salary_field(SalaryField::IncomeTax, MoneyCents::from_major(500))
        .await
        .unwrap();
    let rent = store
        .add_expense(NewExpense::new("Rent", MoneyCents::from_major(1200)))
        .await
        .unwrap();
    store.shift_current_period(1).await.unwrap();
    store
        .add_expense(NewExpense::new("Savings", MoneyCents::from_major(900)).savings(true))
        .await
        .unwrap();
    assert!(store.take_notices().is_empty());

    let reopened = store_with(provider, true).await;
    assert_eq!(reopened.snapshot(), store.snapshot());
    assert_eq!(reopened.current_period(), period("2024-04"));
    assert_eq!(reopened.expenses(period("2024-03"))[0], rent);

    let dashboard = reopened.dashboard();
    assert_eq!(dashboard.salary.net_pay, MoneyCents::from_major(4500));
    assert_eq!(dashboard.summary.balance_remaining, MoneyCents::from_major(4500));
    assert_eq!(dashboard.summary.savings_rate, 20.0);
    assert!(!dashboard.summary.is_healthy_savings());
}

#[tokio::test]
async fn edit_and_delete_work_on_the_current_period() {
    let mut store = store_with(MemoryProvider::default(), false).await;
    let entry = store
        .add_expense(NewExpense::new("Phone", MoneyCents::from_major(40)))
        .await
        .unwrap();

    let edited = store
        .edit_expense(
            &entry.id,
            ExpensePatch {
                amount: Some(MoneyCents::from_major(45)),
                ..ExpensePatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.name, "Phone");
    assert_eq!(edited.amount, MoneyCents::from_major(45));

    let err = store
        .edit_expense(
            &entry.id,
            ExpensePatch {
                name: Some("  ".to_string()),
                ..ExpensePatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidEntry(_)));
    assert_eq!(store.current_expenses()[0], edited);

    store.shift_current_period(-1).await.unwrap();
    let err = store.delete_expense(&entry.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    store.shift_current_period(1).await.unwrap();
    store.delete_expense(&entry.id).await.unwrap();
    assert!(store.current_expenses().is_empty());
    assert_eq!(store.available_periods(), vec![period("2024-03")]);
}

#[tokio::test]
async fn moving_the_period_does_not_create_it() {
    let mut store = store_with(MemoryProvider::default(), false).await;

    store.set_current_period(period("2025-01")).await;
    assert!(store.available_periods().is_empty());

    assert_eq!(store.shift_current_period(-1).await.unwrap(), period("2024-12"));
    assert_eq!(store.shift_current_period(13).await.unwrap(), period("2026-01"));
    store
        .add_expense(NewExpense::new("Gift", MoneyCents::from_major(10)))
        .await
        .unwrap();
    assert_eq!(store.available_periods(), vec![period("2026-01")]);
}

#[tokio::test]
async fn yearly_rollup_counts_present_periods() {
    let mut store = store_with(MemoryProvider::default(), false).await;

    store.set_current_period(period("2024-02")).await;
    store
        .add_expense(NewExpense::new("Food", MoneyCents::from_major(50)))
        .await
        .unwrap();
    store.set_current_period(period("2024-01")).await;
    let placeholder = store
        .add_expense(NewExpense::new("Placeholder", MoneyCents::from_major(1)))
        .await
        .unwrap();
    store.delete_expense(&placeholder.id).await.unwrap();

    let totals = *store.yearly_rollup(2024).totals().unwrap();
    assert_eq!(totals.months_tracked, 2);
    assert_eq!(totals.total_expenses, MoneyCents::from_major(50));
    assert_eq!(totals.monthly_average_expenses, MoneyCents::from_major(25));

    assert_eq!(store.yearly_rollup(2023), YearlyRollup::NoData { year: 2023 });
}

#[tokio::test]
async fn failed_writes_keep_memory_and_queue_notices() {
    let provider = MemoryProvider::default();
    let mut store = store_with(provider.clone(), false).await;
    provider.set_failing(true);

    let entry = store
        .add_expense(NewExpense::new("Coffee", MoneyCents::new(350)))
        .await
        .unwrap();
    store.set_current_period(period("2024-05")).await;
    assert_eq!(store.expenses(period("2024-03")), [entry]);

    let notices = store.take_notices();
    let keys: Vec<SnapshotKey> = notices.iter().map(|notice| notice.key).collect();
    assert_eq!(keys, [SnapshotKey::ExpensesByPeriod, SnapshotKey::CurrentPeriod]);
    assert!(store.take_notices().is_empty());

    provider.set_failing(false);
    let reopened = store_with(provider, false).await;
    assert!(reopened.available_periods().is_empty());
}

#[tokio::test]
async fn unreadable_documents_fall_back_to_defaults() {
    let provider = MemoryProvider::default();
    provider
        .save(SnapshotKey::CurrentPeriod.as_str(), "\"March\"")
        .await
        .unwrap();
    provider
        .save(
            SnapshotKey::SalaryData.as_str(),
            r#"{"basic_salary": -100}"#,
        )
        .await
        .unwrap();

    let store = store_with(provider, true).await;
    assert_eq!(store.current_period(), period("2024-03"));
    assert_eq!(store.salary(), &SalaryConfiguration::default());
}

#[tokio::test]
async fn invalid_persisted_expenses_are_dropped() {
    let provider = MemoryProvider::default();
    provider
        .save(
            SnapshotKey::ExpensesByPeriod.as_str(),
            r#"{"2024-03": [
                {"id": "x", "name": "", "amount": 100},
                {"id": "y", "name": "Refund", "amount": -500},
                {"id": "z", "name": "Rent", "amount": 90000}
            ]}"#,
        )
        .await
        .unwrap();

    let store = store_with(provider, true).await;
    let ids: Vec<&str> = store
        .current_expenses()
        .iter()
        .map(|entry| entry.id.as_str())
        .collect();
    assert_eq!(ids, ["z"]);
    assert_eq!(
        store.dashboard().period_totals.total_expenses,
        MoneyCents::from_major(900)
    );
}

#[tokio::test]
async fn expense_dates_stay_inside_the_current_period() {
    let mut store = store_with(MemoryProvider::default(), false).await;
    let day = |y, m, d| chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap();

    let err = store
        .add_expense(NewExpense::new("Bus", MoneyCents::from_major(3)).date(day(2023, 1, 5)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidEntry(_)));
    assert!(store.available_periods().is_empty());

    let entry = store
        .add_expense(NewExpense::new("Bus", MoneyCents::from_major(3)).date(day(2024, 3, 5)))
        .await
        .unwrap();
    let err = store
        .edit_expense(
            &entry.id,
            ExpensePatch {
                date: Some(day(2024, 4, 1)),
                ..ExpensePatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidEntry(_)));
    assert_eq!(store.current_expenses(), [entry]);
}

#[tokio::test]
async fn negative_salary_is_rejected_as_a_whole() {
    let mut store = store_with(MemoryProvider::default(), false).await;
    let mut salary = SalaryConfiguration::default();
    salary
        .set(SalaryField::BasicSalary, MoneyCents::from_major(3000))
        .unwrap();
    store.update_salary(salary.clone()).await.unwrap();

    let err = store
        .set_salary_field(SalaryField::Bonus, MoneyCents::new(-1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert_eq!(store.salary(), &salary);
}

#[tokio::test]
async fn reset_clears_memory_and_provider() {
    let provider = MemoryProvider::default();
    let mut store = store_with(provider.clone(), true).await;
    store.shift_current_period(2).await.unwrap();
    store
        .add_expense(NewExpense::new("Taxi", MoneyCents::from_major(12)))
        .await
        .unwrap();
    assert!(!provider.is_empty());

    store.reset().await;
    assert!(provider.is_empty());
    assert_eq!(store.current_period(), period("2024-03"));
    assert!(store.available_periods().is_empty());
    assert_eq!(store.employee(), &EmployeeInfo::default());
}

#[tokio::test]
async fn database_provider_round_trip() {
    let db = database().await;
    let mut store = PeriodStore::builder()
        .provider(DatabaseProvider::new(db.clone()))
        .default_period(period("2024-03"))
        .build()
        .await
        .unwrap();

    store
        .add_expense(NewExpense::new("Bus", MoneyCents::from_major(3)))
        .await
        .unwrap();
    store
        .add_expense(NewExpense::new("Bus", MoneyCents::from_major(4)))
        .await
        .unwrap();
    assert!(store.take_notices().is_empty());

    let reopened = PeriodStore::builder()
        .provider(DatabaseProvider::new(db))
        .default_period(period("2030-01"))
        .build()
        .await
        .unwrap();
    assert_eq!(reopened.current_period(), period("2030-01"));
    assert_eq!(reopened.expenses(period("2024-03")).len(), 9);
    assert_eq!(reopened.expenses_by_period(), store.expenses_by_period());
}

#[tokio::test]
async fn file_provider_round_trip() {
    let dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../target/test_data")
        .join(Uuid::new_v4().to_string());

    let mut store = PeriodStore::builder()
        .provider(FileProvider::new(&dir))
        .default_period(period("2024-03"))
        .seed_defaults(false)
        .build()
        .await
        .unwrap();
    store.shift_current_period(-3).await.unwrap();
    assert!(dir.join("current_period.json").exists());

    let reopened = PeriodStore::builder()
        .provider(FileProvider::new(&dir))
        .build()
        .await
        .unwrap();
    assert_eq!(reopened.current_period(), period("2023-12"));

    std::fs::remove_dir_all(&dir).unwrap();
}
