use std::path::PathBuf;
use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use rusqlite::Connection;

use crate::database::queries;
use crate::error::AppResult;
use crate::models::{InsightKind, Settings, TimeOfDay};
use crate::services::streak_engine;

const WINDOW_DAYS: u64 = 30;
const MIN_PATTERN_COMPLETIONS: u32 = 10;
const STREAK_MILESTONES: [u32; 4] = [7, 21, 30, 100];
const MAX_INSIGHTS_PER_RUN: usize = 3;

struct Candidate {
    kind: InsightKind,
    title: String,
    description: String,
    dedup_key: String,
}

/// Scans the user's habits over the trailing 30 days and persists up to
/// three insights, in the order pattern, celebration, prediction,
/// suggestion. Dedup keys make repeated and concurrent runs safe: a row
/// that already exists is silently skipped, and a milestone is celebrated
/// once per habit.
pub fn generate_insights(conn: &Connection, user_id: &str, today: NaiveDate) -> AppResult<usize> {
    let habits = queries::list_habits(conn, user_id)?;
    if habits.is_empty() {
        return Ok(0);
    }

    let start = today - Days::new(WINDOW_DAYS - 1);
    let mut candidates: Vec<Candidate> = Vec::new();

    // Pattern: a morning habit the user all but never misses.
    for habit in &habits {
        let done = queries::count_completed_between(conn, &habit.id, start, today)?;
        if done < MIN_PATTERN_COMPLETIONS {
            continue;
        }

        let rate = streak_engine::completion_rate(conn, habit, start, today)?;
        if rate > 80 && habit.time_of_day == TimeOfDay::Morning {
            candidates.push(Candidate {
                kind: InsightKind::Pattern,
                title: format!("{} thriving in mornings!", habit.name),
                description: format!(
                    "You complete \"{}\" {}% of the time in the morning. Your consistency is impressive!",
                    habit.name, rate
                ),
                dedup_key: format!("pattern:{}:{}", habit.id, today),
            });
        }
    }

    // Celebration: streak sitting exactly on a milestone. A habit that
    // streaks past one between runs is not retroactively celebrated.
    for habit in &habits {
        if STREAK_MILESTONES.contains(&habit.streak) {
            candidates.push(Candidate {
                kind: InsightKind::Celebration,
                title: format!("{}-day streak!", habit.streak),
                description: format!(
                    "You've maintained \"{}\" for {} days straight. You're building real momentum!",
                    habit.name, habit.streak
                ),
                dedup_key: format!("celebration:{}:{}", habit.id, habit.streak),
            });
        }
    }

    // Prediction: strong average completion across the board.
    let mut rate_sum = 0u32;
    for habit in &habits {
        rate_sum += streak_engine::completion_rate(conn, habit, start, today)?;
    }
    let avg_rate = rate_sum / habits.len() as u32;
    if avg_rate > 70 {
        candidates.push(Candidate {
            kind: InsightKind::Prediction,
            title: "High success probability today".to_string(),
            description: format!(
                "Based on your {}% completion rate, you're likely to complete most of your habits today. Keep it up!",
                avg_rate
            ),
            dedup_key: format!("prediction:{}", today),
        });
    }

    // Suggestion: an evening habit that keeps slipping.
    for habit in &habits {
        let rate = streak_engine::completion_rate(conn, habit, start, today)?;
        if rate < 50 && habit.time_of_day == TimeOfDay::Evening {
            candidates.push(Candidate {
                kind: InsightKind::Suggestion,
                title: format!("Try moving \"{}\" to mornings", habit.name),
                description: format!(
                    "Your evening completion rate is {}%. Morning habits often have higher success rates.",
                    rate
                ),
                dedup_key: format!("suggestion:{}:{}", habit.id, today),
            });
        }
    }

    let mut inserted = 0;
    for candidate in candidates.into_iter().take(MAX_INSIGHTS_PER_RUN) {
        if queries::insert_insight(
            conn,
            user_id,
            candidate.kind,
            &candidate.title,
            &candidate.description,
            &candidate.dedup_key,
        )? {
            inserted += 1;
        }
    }

    Ok(inserted)
}

/// Spawns the periodic generation pass over all known users.
pub fn start_insight_engine(db_path: PathBuf, settings: Settings) {
    if !settings.insights.enabled {
        log::info!("insight engine disabled in settings");
        return;
    }

    let interval = Duration::from_secs(settings.insights.interval_mins * 60);
    let startup_delay = Duration::from_secs(settings.insights.startup_delay_secs);
    let timezone = settings.general.timezone.clone();

    tokio::spawn(async move {
        tokio::time::sleep(startup_delay).await;
        log::info!(
            "insight engine started (runs every {}m)",
            settings.insights.interval_mins
        );

        loop {
            if let Err(e) = run_generation(&db_path, &timezone) {
                log::error!("insight generation failed: {}", e);
            }

            tokio::time::sleep(interval).await;
        }
    });
}

fn run_generation(db_path: &std::path::Path, timezone: &str) -> AppResult<()> {
    let conn = Connection::open(db_path).map_err(crate::error::AppError::from)?;
    let today = match timezone.parse::<chrono_tz::Tz>() {
        Ok(tz) => Utc::now().with_timezone(&tz).date_naive(),
        Err(_) => Utc::now().date_naive(),
    };

    for user_id in queries::all_user_ids(&conn)? {
        match generate_insights(&conn, &user_id, today) {
            Ok(0) => {}
            Ok(n) => log::info!("generated {} insight(s) for {}", n, user_id),
            Err(e) => log::warn!("insight generation for {} failed: {}", user_id, e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::open_test_db;
    use crate::models::{Frequency, Habit};
    use crate::services::streak_engine::record_completion;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn seed_habit(conn: &Connection, id: &str, time_of_day: TimeOfDay, streak: u32) {
        let habit = Habit {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            name: format!("Habit {}", id),
            frequency: Frequency::Daily,
            time_of_day,
            streak,
            longest_streak: streak,
            paused: false,
            pause_reason: None,
            linked_vision_id: None,
            linked_path_id: None,
            created_at: 0,
        };
        queries::insert_habit(conn, &habit).unwrap();
    }

    #[test]
    fn milestone_streak_emits_one_celebration() {
        let conn = open_test_db();
        seed_habit(&conn, "h1", TimeOfDay::Afternoon, 7);

        let inserted = generate_insights(&conn, "user-1", d("2024-03-10")).unwrap();
        assert_eq!(inserted, 1);

        let insights = queries::active_insights(&conn, "user-1").unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Celebration);
    }

    #[test]
    fn rerunning_generation_does_not_duplicate() {
        let conn = open_test_db();
        seed_habit(&conn, "h1", TimeOfDay::Afternoon, 7);
        let today = d("2024-03-10");

        generate_insights(&conn, "user-1", today).unwrap();
        let second = generate_insights(&conn, "user-1", today).unwrap();

        assert_eq!(second, 0);
        assert_eq!(queries::active_insights(&conn, "user-1").unwrap().len(), 1);
    }

    #[test]
    fn off_milestone_streak_is_not_celebrated() {
        let conn = open_test_db();
        seed_habit(&conn, "h1", TimeOfDay::Afternoon, 8);

        let inserted = generate_insights(&conn, "user-1", d("2024-03-10")).unwrap();
        assert_eq!(inserted, 0);
    }

    #[test]
    fn consistent_morning_habit_emits_a_pattern() {
        let mut conn = open_test_db();
        seed_habit(&conn, "h1", TimeOfDay::Morning, 0);
        let today = d("2024-03-30");

        // 28 of the last 30 days completed.
        for offset in 0..28u64 {
            let day = today - Days::new(offset);
            record_completion(&mut conn, "user-1", "h1", day, true, None, today).unwrap();
        }

        generate_insights(&conn, "user-1", today).unwrap();
        let insights = queries::active_insights(&conn, "user-1").unwrap();
        // 93% rate also clears the prediction threshold.
        assert!(insights.iter().any(|i| i.kind == InsightKind::Pattern));
        assert!(insights.iter().any(|i| i.kind == InsightKind::Prediction));
    }

    #[test]
    fn struggling_evening_habit_gets_a_suggestion() {
        let mut conn = open_test_db();
        seed_habit(&conn, "h1", TimeOfDay::Evening, 0);
        let today = d("2024-03-30");

        // 4 of the last 30 days: well under 50%.
        for offset in [0u64, 3, 9, 15] {
            let day = today - Days::new(offset);
            record_completion(&mut conn, "user-1", "h1", day, true, None, today).unwrap();
        }

        generate_insights(&conn, "user-1", today).unwrap();
        let insights = queries::active_insights(&conn, "user-1").unwrap();
        assert!(insights.iter().any(|i| i.kind == InsightKind::Suggestion));
    }

    #[test]
    fn at_most_three_insights_per_run() {
        let conn = open_test_db();
        // Four milestone habits would produce four celebrations.
        for (i, streak) in [7u32, 21, 30, 100].iter().enumerate() {
            seed_habit(&conn, &format!("h{}", i), TimeOfDay::Afternoon, *streak);
        }

        let inserted = generate_insights(&conn, "user-1", d("2024-03-10")).unwrap();
        assert_eq!(inserted, 3);
    }
}
