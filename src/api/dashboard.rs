use crate::auth::AppContext;
use crate::database::queries;
use crate::error::AppResult;
use crate::models::{DashboardOverview, TodayHabit};
use crate::services::growth;

/// Habits for the today screen with their completion state for today.
/// Paused habits are left off the list.
pub fn today_habits(ctx: &AppContext) -> AppResult<Vec<TodayHabit>> {
    let user_id = ctx.require_user()?;
    let conn = ctx.connect()?;
    let today = ctx.today();

    let mut items = Vec::new();
    for habit in queries::list_habits(&conn, user_id)? {
        if habit.paused {
            continue;
        }
        let completed = queries::completion_value(&conn, &habit.id, today)?.unwrap_or(false);
        items.push(TodayHabit {
            id: habit.id,
            name: habit.name,
            time_of_day: habit.time_of_day,
            streak: habit.streak,
            completed,
        });
    }

    Ok(items)
}

pub fn overview(ctx: &AppContext) -> AppResult<DashboardOverview> {
    let user_id = ctx.require_user()?;
    let habits = today_habits(ctx)?;
    let conn = ctx.connect()?;

    Ok(DashboardOverview {
        today_completed: habits.iter().filter(|h| h.completed).count() as u32,
        today_total: habits.len() as u32,
        growth: growth::growth_summary(&conn, user_id)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::habits;
    use crate::database;
    use crate::models::{CreateHabitRequest, Frequency, Settings, TimeOfDay};

    fn ctx() -> (tempfile::TempDir, AppContext) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("ascend.db");
        database::init_database(&db_path).unwrap();
        let ctx = AppContext::authenticated(&db_path, Settings::default(), "user-1").unwrap();
        (dir, ctx)
    }

    #[test]
    fn overview_reflects_todays_completions() {
        let (_dir, ctx) = ctx();

        for name in ["Meditate", "Read"] {
            habits::create_habit(
                &ctx,
                &CreateHabitRequest {
                    name: name.to_string(),
                    frequency: Frequency::Daily,
                    time_of_day: TimeOfDay::Morning,
                    linked_vision_id: None,
                    linked_path_id: None,
                },
            )
            .unwrap();
        }

        let listed = today_habits(&ctx).unwrap();
        habits::toggle_completion(&ctx, &listed[0].id, ctx.today(), true, None).unwrap();

        let overview = overview(&ctx).unwrap();
        assert_eq!(overview.today_total, 2);
        assert_eq!(overview.today_completed, 1);
        assert_eq!(overview.growth.total_habits, 2);
        // 2 habits x5 plus avg streak 0.5 x2: 11.
        assert_eq!(overview.growth.growth_score, 11);
    }

    #[test]
    fn paused_habits_stay_off_the_today_screen() {
        let (_dir, ctx) = ctx();

        let habit = habits::create_habit(
            &ctx,
            &CreateHabitRequest {
                name: "Late workout".to_string(),
                frequency: Frequency::Daily,
                time_of_day: TimeOfDay::Evening,
                linked_vision_id: None,
                linked_path_id: None,
            },
        )
        .unwrap();

        habits::set_paused(&ctx, &habit.id, true, Some("travel week")).unwrap();
        assert!(today_habits(&ctx).unwrap().is_empty());
    }
}
