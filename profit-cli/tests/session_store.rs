use std::env;
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use profit_cli::state::Session;
use profit_core::calculations::Period;
use profit_core::input::SnapshotForm;
use profit_core::{DailyRecordRepository, VehicleConfig};
use profit_db_sqlite::SqliteRepository;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn memory_store() -> Option<Box<dyn DailyRecordRepository>> {
    let repo = SqliteRepository::open(":memory:")
        .await
        .expect("open memory store");
    Some(Box::new(repo))
}

async fn file_store(path: &str) -> Option<Box<dyn DailyRecordRepository>> {
    let repo = SqliteRepository::open(path).await.expect("open file store");
    Some(Box::new(repo))
}

fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{name}_driver_profit_session.db"));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

fn day(
    y: i32,
    m: u32,
    d: u32,
) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A $250 shift over 150 miles at 30 mpg and $3/gal with a $10 car wash.
fn fill_shift(session: &mut Session) {
    session.apply_vehicle_defaults(&VehicleConfig {
        fuel_economy: dec!(30),
        fuel_price: dec!(3),
        daily_goal: dec!(200),
        updated_at: None,
    });
    let mut form = SnapshotForm::from_snapshot(session.inputs());
    form.uber_earnings = "250".into();
    form.odometer_start = "1000".into();
    form.odometer_end = "1150".into();
    session.apply_form(&form);
    session.add_adhoc_expense("Car wash", dec!(10)).unwrap();
}

// ============================================================================
// Save and restore
// ============================================================================

#[tokio::test]
async fn saved_record_restores_inputs_and_metrics() {
    let mut session = Session::new(memory_store().await);
    fill_shift(&mut session);
    session.add_extra_income("Bonus", dec!(20)).unwrap();
    let date = day(2025, 3, 1);

    let saved = session.save_for(date).await.unwrap();
    assert_eq!(saved.metrics.net_profit, dec!(245));

    session.remove_adhoc_expense(0);
    session.remove_extra_income(0);
    session.apply_form(&SnapshotForm::default());
    assert_eq!(session.metrics().gross_income, Decimal::ZERO);

    assert!(session.load(date).await.unwrap());

    assert_eq!(session.inputs(), &saved.inputs);
    assert_eq!(session.metrics(), &saved.metrics);
    assert_eq!(session.inputs().adhoc_expenses.len(), 1);
    assert_eq!(session.inputs().extra_income.len(), 1);
}

#[tokio::test]
async fn load_of_unsaved_date_leaves_session_untouched() {
    let mut session = Session::new(memory_store().await);
    fill_shift(&mut session);
    let before = session.inputs().clone();

    assert!(!session.load(day(2025, 3, 1)).await.unwrap());
    assert_eq!(session.inputs(), &before);
}

#[tokio::test]
async fn saving_twice_replaces_the_day() {
    let mut session = Session::new(memory_store().await);
    fill_shift(&mut session);
    let date = day(2025, 3, 1);
    session.save_for(date).await.unwrap();

    session.remove_adhoc_expense(0);
    session.save_for(date).await.unwrap();

    let history = session.list_history(30).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].metrics.net_profit, dec!(235));
    assert!(history[0].inputs.adhoc_expenses.is_empty());
}

#[tokio::test]
async fn start_restores_todays_record_from_a_reopened_store() {
    let db_path = setup_test_db("start_restores_today");
    let today = day(2025, 3, 4);

    let saved = {
        let mut session = Session::new(file_store(&db_path).await);
        fill_shift(&mut session);
        session.save_for(today).await.unwrap()
    };

    let session = Session::start(file_store(&db_path).await, today).await;
    assert_eq!(session.inputs(), &saved.inputs);
    assert_eq!(session.metrics().net_profit, dec!(225));

    let other_day = Session::start(file_store(&db_path).await, day(2025, 3, 5)).await;
    assert_eq!(other_day.metrics().gross_income, Decimal::ZERO);

    fs::remove_file(&db_path).ok();
}

// ============================================================================
// History and statistics
// ============================================================================

#[tokio::test]
async fn statistics_cover_the_most_recent_days() {
    let mut session = Session::new(memory_store().await);
    fill_shift(&mut session);
    for d in 1..=5 {
        session.save_for(day(2025, 3, d)).await.unwrap();
    }

    let history = session.list_history(3).await.unwrap();
    let dates: Vec<NaiveDate> = history.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![day(2025, 3, 5), day(2025, 3, 4), day(2025, 3, 3)]);

    let stats = session.show_statistics(3).await.unwrap();
    assert_eq!(stats.count, 3);
    assert_eq!(stats.total_income, dec!(750));
    assert_eq!(stats.total_expenses, dec!(75));
    assert_eq!(stats.total_profit, dec!(675));
    assert_eq!(stats.average_daily_profit, dec!(225));
    assert_eq!(stats.total_miles, dec!(450));
    assert_eq!(stats.total_fuel_cost, dec!(45));
}

#[tokio::test]
async fn statistics_of_empty_store_are_zero() {
    let session = Session::new(memory_store().await);

    let stats = session.show_statistics(30).await.unwrap();

    assert_eq!(stats.count, 0);
    assert_eq!(stats.average_daily_profit, Decimal::ZERO);
}

#[tokio::test]
async fn week_summary_uses_the_current_goal() {
    let mut session = Session::new(memory_store().await);
    fill_shift(&mut session);
    // Sunday before, then Monday and Wednesday of the week of 2025-03-10.
    for d in [9, 10, 12] {
        session.save_for(day(2025, 3, d)).await.unwrap();
    }

    let summary = session
        .period_summary(Period::Week, day(2025, 3, 12))
        .await
        .unwrap();

    assert_eq!(summary.start, day(2025, 3, 10));
    assert_eq!(summary.end, day(2025, 3, 16));
    assert_eq!(summary.days_in_period, 7);
    assert_eq!(summary.statistics.count, 2);
    assert_eq!(summary.period_goal, dec!(1400));
    assert_eq!(summary.goal_delta, dec!(-950));
}

// ============================================================================
// Delete and vehicle defaults
// ============================================================================

#[tokio::test]
async fn delete_removes_only_that_day() {
    let mut session = Session::new(memory_store().await);
    fill_shift(&mut session);
    session.save_for(day(2025, 3, 1)).await.unwrap();
    session.save_for(day(2025, 3, 2)).await.unwrap();

    session.delete_record(day(2025, 3, 1)).await.unwrap();
    session.delete_record(day(2025, 3, 1)).await.unwrap();

    assert_eq!(session.get_record(day(2025, 3, 1)).await.unwrap(), None);
    assert!(session.get_record(day(2025, 3, 2)).await.unwrap().is_some());
}

#[tokio::test]
async fn vehicle_update_applies_to_new_sessions() {
    let db_path = setup_test_db("vehicle_update");

    {
        let mut session = Session::new(file_store(&db_path).await);
        assert_eq!(session.vehicle_config().await.unwrap(), VehicleConfig::default());

        let updated = session
            .update_vehicle_config(VehicleConfig {
                fuel_economy: dec!(28.5),
                fuel_price: dec!(3.45),
                daily_goal: dec!(175),
                updated_at: None,
            })
            .await
            .unwrap();

        assert!(updated.updated_at.is_some());
        assert_eq!(session.inputs().fuel_economy, dec!(28.5));
    }

    let session = Session::with_vehicle_defaults(file_store(&db_path).await).await;
    assert_eq!(session.inputs().fuel_economy, dec!(28.5));
    assert_eq!(session.inputs().fuel_price, dec!(3.45));
    assert_eq!(session.inputs().daily_goal, dec!(175));

    fs::remove_file(&db_path).ok();
}
