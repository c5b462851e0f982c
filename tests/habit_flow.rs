//! End-to-end flows through the api facade on a real on-disk store.

use ascend::api::{checkins, dashboard, habits, insights};
use ascend::auth::AppContext;
use ascend::database;
use ascend::error::AppError;
use ascend::models::{
    CheckInRequest, CreateHabitRequest, Frequency, InsightKind, Mood, Settings, TimeOfDay,
};
use chrono::Days;

fn setup() -> (tempfile::TempDir, AppContext) {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("ascend.db");
    database::init_database(&db_path).expect("init store");
    let ctx =
        AppContext::authenticated(&db_path, Settings::default(), "user-1").expect("context");
    (dir, ctx)
}

fn morning_meditation() -> CreateHabitRequest {
    CreateHabitRequest {
        name: "Morning Meditation".to_string(),
        frequency: Frequency::Daily,
        time_of_day: TimeOfDay::Morning,
        linked_vision_id: None,
        linked_path_id: None,
    }
}

/// The full mark / advance / backfill-unmark sequence: two consecutive
/// completed days, then the older one is undone and the streak recounts
/// from the ledger.
#[test]
fn mark_advance_and_backfill_unmark() {
    let (_dir, ctx) = setup();
    let habit = habits::create_habit(&ctx, &morning_meditation()).unwrap();

    let yesterday = ctx.today() - Days::new(1);
    let today = ctx.today();

    let updated = habits::toggle_completion(&ctx, &habit.id, yesterday, true, None).unwrap();
    assert_eq!(updated.streak, 1);
    assert_eq!(updated.longest_streak, 1);

    let updated = habits::toggle_completion(&ctx, &habit.id, today, true, None).unwrap();
    assert_eq!(updated.streak, 2);
    assert_eq!(updated.longest_streak, 2);

    // Undo the older day: only today's completion remains in sequence.
    let updated = habits::toggle_completion(&ctx, &habit.id, yesterday, false, None).unwrap();
    assert_eq!(updated.streak, 1);
    assert_eq!(updated.longest_streak, 2);

    let detail = habits::habit_detail(&ctx, &habit.id).unwrap();
    assert_eq!(detail.habit.streak, 1);
    assert!(detail.habit.longest_streak >= detail.habit.streak);
}

/// A week-long streak lands exactly on the first celebration milestone;
/// generation emits it once and a re-run adds nothing.
#[test]
fn week_long_streak_earns_one_celebration() {
    let (_dir, ctx) = setup();
    let habit = habits::create_habit(&ctx, &morning_meditation()).unwrap();

    for offset in (0..7u64).rev() {
        let day = ctx.today() - Days::new(offset);
        habits::toggle_completion(&ctx, &habit.id, day, true, None).unwrap();
    }

    let detail = habits::habit_detail(&ctx, &habit.id).unwrap();
    assert_eq!(detail.habit.streak, 7);

    insights::generate_now(&ctx).unwrap();
    let feed = insights::active_insights(&ctx).unwrap();
    let celebrations: Vec<_> = feed
        .iter()
        .filter(|i| i.kind == InsightKind::Celebration)
        .collect();
    assert_eq!(celebrations.len(), 1);

    insights::generate_now(&ctx).unwrap();
    let feed = insights::active_insights(&ctx).unwrap();
    assert_eq!(
        feed.iter().filter(|i| i.kind == InsightKind::Celebration).count(),
        1
    );
}

#[test]
fn check_in_then_dashboard_reflects_everything() {
    let (_dir, ctx) = setup();
    habits::create_habit(&ctx, &morning_meditation()).unwrap();

    checkins::submit_check_in(
        &ctx,
        &CheckInRequest {
            energy: 4,
            mood: Mood::Happy,
            gratitude: "a quiet morning".to_string(),
            challenge: None,
        },
    )
    .unwrap();

    assert_eq!(checkins::check_in_streak(&ctx).unwrap(), 1);
    assert!(checkins::today_check_in(&ctx).unwrap().is_some());

    let overview = dashboard::overview(&ctx).unwrap();
    assert_eq!(overview.growth.total_habits, 1);
    assert_eq!(overview.growth.total_check_ins, 1);
    // 1 habit x5 plus 1 check-in: 6.
    assert_eq!(overview.growth.growth_score, 6);
}

#[test]
fn every_operation_fails_closed_without_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("ascend.db");
    database::init_database(&db_path).unwrap();
    let ctx = AppContext::anonymous(&db_path, Settings::default());

    assert!(matches!(
        habits::list_habits(&ctx).unwrap_err(),
        AppError::NotAuthenticated
    ));
    assert!(matches!(
        checkins::check_in_streak(&ctx).unwrap_err(),
        AppError::NotAuthenticated
    ));
    assert!(matches!(
        insights::active_insights(&ctx).unwrap_err(),
        AppError::NotAuthenticated
    ));
    assert!(matches!(
        dashboard::overview(&ctx).unwrap_err(),
        AppError::NotAuthenticated
    ));
}
