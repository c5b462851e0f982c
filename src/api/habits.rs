use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AppContext;
use crate::database::queries;
use crate::error::{AppError, AppResult};
use crate::models::{CreateHabitRequest, Habit, HabitCompletion, RateSummary};
use crate::services::streak_engine;

/// The habit detail screen: streak fields, rolling rates, and the last 90
/// days of ledger history for the heatmap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitDetail {
    pub habit: Habit,
    pub rates: RateSummary,
    pub completions: Vec<HabitCompletion>,
}

pub fn create_habit(ctx: &AppContext, request: &CreateHabitRequest) -> AppResult<Habit> {
    let user_id = ctx.require_user()?;

    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::validation("name", "cannot be empty"));
    }

    let habit = Habit {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name: name.to_string(),
        frequency: request.frequency,
        time_of_day: request.time_of_day,
        streak: 0,
        longest_streak: 0,
        paused: false,
        pause_reason: None,
        linked_vision_id: request.linked_vision_id.clone(),
        linked_path_id: request.linked_path_id.clone(),
        created_at: Utc::now().timestamp(),
    };

    let conn = ctx.connect()?;
    queries::insert_habit(&conn, &habit)?;
    Ok(habit)
}

pub fn list_habits(ctx: &AppContext) -> AppResult<Vec<Habit>> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;
    Ok(queries::list_habits(&conn, user_id)?)
}

pub fn habit_detail(ctx: &AppContext, habit_id: &str) -> AppResult<HabitDetail> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;

    let habit = queries::get_habit(&conn, user_id, habit_id)?.ok_or(AppError::NotFound("habit"))?;

    let today = ctx.today();
    let rates = streak_engine::rate_summary(&conn, &habit, today)?;
    let completions =
        queries::completions_between(&conn, habit_id, today - Days::new(89), today)?;

    Ok(HabitDetail {
        habit,
        rates,
        completions,
    })
}

/// Marks or unmarks a habit for a date and returns the updated habit.
/// The ledger write and the streak update land in one transaction.
pub fn toggle_completion(
    ctx: &AppContext,
    habit_id: &str,
    date: NaiveDate,
    completed: bool,
    note: Option<&str>,
) -> AppResult<Habit> {
    let user_id = ctx.require_user()?;
    let mut conn = ctx.connect()?;
    streak_engine::record_completion(
        &mut conn,
        user_id,
        habit_id,
        date,
        completed,
        note,
        ctx.today(),
    )
}

pub fn set_paused(
    ctx: &AppContext,
    habit_id: &str,
    paused: bool,
    reason: Option<&str>,
) -> AppResult<()> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;

    if queries::set_habit_paused(&conn, user_id, habit_id, paused, reason)? {
        Ok(())
    } else {
        Err(AppError::NotFound("habit"))
    }
}

/// Permanently removes the habit and its completion history.
pub fn delete_habit(ctx: &AppContext, habit_id: &str) -> AppResult<()> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;

    if queries::delete_habit(&conn, user_id, habit_id)? {
        Ok(())
    } else {
        Err(AppError::NotFound("habit"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;
    use crate::models::{Frequency, Settings, TimeOfDay};

    fn ctx() -> (tempfile::TempDir, AppContext) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("ascend.db");
        database::init_database(&db_path).unwrap();
        let ctx = AppContext::authenticated(&db_path, Settings::default(), "user-1").unwrap();
        (dir, ctx)
    }

    fn meditation() -> CreateHabitRequest {
        CreateHabitRequest {
            name: "Morning Meditation".to_string(),
            frequency: Frequency::Daily,
            time_of_day: TimeOfDay::Morning,
            linked_vision_id: None,
            linked_path_id: None,
        }
    }

    #[test]
    fn anonymous_callers_cannot_create_habits() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("ascend.db");
        database::init_database(&db_path).unwrap();
        let ctx = AppContext::anonymous(&db_path, Settings::default());

        let err = create_habit(&ctx, &meditation()).unwrap_err();
        assert!(matches!(err, AppError::NotAuthenticated));
    }

    #[test]
    fn blank_name_is_rejected() {
        let (_dir, ctx) = ctx();
        let mut request = meditation();
        request.name = "   ".to_string();

        let err = create_habit(&ctx, &request).unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "name", .. }));
    }

    #[test]
    fn toggle_then_detail_round_trip() {
        let (_dir, ctx) = ctx();
        let habit = create_habit(&ctx, &meditation()).unwrap();

        let updated = toggle_completion(&ctx, &habit.id, ctx.today(), true, None).unwrap();
        assert_eq!(updated.streak, 1);

        let detail = habit_detail(&ctx, &habit.id).unwrap();
        assert_eq!(detail.habit.streak, 1);
        assert_eq!(detail.completions.len(), 1);
        assert!(detail.rates.seven_day > 0);
    }

    #[test]
    fn delete_removes_habit_and_ledger() {
        let (_dir, ctx) = ctx();
        let habit = create_habit(&ctx, &meditation()).unwrap();
        toggle_completion(&ctx, &habit.id, ctx.today(), true, None).unwrap();

        delete_habit(&ctx, &habit.id).unwrap();

        assert!(matches!(
            habit_detail(&ctx, &habit.id).unwrap_err(),
            AppError::NotFound("habit")
        ));
        let conn = ctx.connect().unwrap();
        let ledger: i64 = conn
            .query_row("SELECT COUNT(*) FROM habit_completions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(ledger, 0);
    }
}
