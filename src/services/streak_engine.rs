use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use rusqlite::Connection;

use crate::database::queries;
use crate::error::{AppError, AppResult};
use crate::models::{Frequency, Habit, RateSummary};

/// Records a completion toggle for one habit on one date and keeps the
/// streak fields in step with the ledger. The ledger upsert and the habit
/// update commit in a single transaction, so an interrupted call never
/// leaves them disagreeing.
///
/// Streak policy: the streak only moves when the stored value for `date`
/// actually transitions. Re-marking an already-completed day is a no-op.
/// On any transition the streak is recomputed by walking the ledger
/// backward from today, which makes an undo of the most recent day a
/// decrement and a backfill of a past day a full recount.
pub fn record_completion(
    conn: &mut Connection,
    user_id: &str,
    habit_id: &str,
    date: NaiveDate,
    completed: bool,
    note: Option<&str>,
    today: NaiveDate,
) -> AppResult<Habit> {
    let tx = conn.transaction()?;

    let mut habit =
        queries::get_habit(&tx, user_id, habit_id)?.ok_or(AppError::NotFound("habit"))?;

    let previous = queries::completion_value(&tx, habit_id, date)?;
    queries::upsert_completion(&tx, habit_id, date, completed, note)?;

    if previous != Some(completed) {
        let streak = recompute_streak(&tx, &habit, today)?;
        habit.streak = streak;
        // Ratchet: the longest streak only ever increases.
        habit.longest_streak = habit.longest_streak.max(streak);
        queries::update_habit_streak(&tx, habit_id, habit.streak, habit.longest_streak)?;
    }

    tx.commit()?;
    Ok(habit)
}

/// Walks qualifying dates backward from `today`, counting consecutive
/// completed days. An uncompleted *today* is skipped rather than treated
/// as a break; the day is not over yet.
fn recompute_streak(conn: &Connection, habit: &Habit, today: NaiveDate) -> AppResult<u32> {
    let completed: HashSet<NaiveDate> = queries::completed_dates(conn, &habit.id)?
        .into_iter()
        .collect();

    let mut cursor = most_recent_qualifying(habit.frequency, today);
    if cursor == today && !completed.contains(&today) {
        cursor = previous_qualifying(habit.frequency, cursor);
    }

    let mut streak = 0u32;
    while completed.contains(&cursor) {
        streak += 1;
        cursor = previous_qualifying(habit.frequency, cursor);
    }

    Ok(streak)
}

fn most_recent_qualifying(frequency: Frequency, date: NaiveDate) -> NaiveDate {
    if frequency.qualifies(date) {
        date
    } else {
        previous_qualifying(frequency, date)
    }
}

fn previous_qualifying(frequency: Frequency, date: NaiveDate) -> NaiveDate {
    let mut cursor = date - Days::new(1);
    while !frequency.qualifies(cursor) {
        cursor = cursor - Days::new(1);
    }
    cursor
}

/// Completed days over expected occurrences in `[start, end]`, as an
/// integer percent. A window with zero expected occurrences yields 0.
pub fn completion_rate(
    conn: &Connection,
    habit: &Habit,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<u32> {
    let expected = expected_occurrences(habit.frequency, start, end);
    if expected == 0 {
        return Ok(0);
    }

    let done = queries::count_completed_between(conn, &habit.id, start, end)?;
    let rate = (done as f64 / expected as f64 * 100.0).round() as u32;
    Ok(rate.min(100))
}

/// How many completions the frequency calls for across `[start, end]`.
pub fn expected_occurrences(frequency: Frequency, start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }

    let days = (end - start).num_days() + 1;
    match frequency {
        Frequency::Daily => days as u32,
        Frequency::Weekdays | Frequency::Weekends => {
            let mut count = 0u32;
            let mut cursor = start;
            while cursor <= end {
                if frequency.qualifies(cursor) {
                    count += 1;
                }
                cursor = cursor + Days::new(1);
            }
            count
        }
        Frequency::TimesPerWeek(n) => (days as f64 / 7.0 * n as f64).round() as u32,
    }
}

/// 7/30/90-day rates ending today, for the habit detail screen.
pub fn rate_summary(conn: &Connection, habit: &Habit, today: NaiveDate) -> AppResult<RateSummary> {
    let window = |days: u64| -> AppResult<u32> {
        let start = today - Days::new(days - 1);
        completion_rate(conn, habit, start, today)
    };

    Ok(RateSummary {
        seven_day: window(7)?,
        thirty_day: window(30)?,
        ninety_day: window(90)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::open_test_db;
    use crate::models::TimeOfDay;
    use chrono::Utc;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn seed_habit(conn: &Connection, frequency: Frequency) -> Habit {
        let habit = Habit {
            id: "habit-1".to_string(),
            user_id: "user-1".to_string(),
            name: "Morning Meditation".to_string(),
            frequency,
            time_of_day: TimeOfDay::Morning,
            streak: 0,
            longest_streak: 0,
            paused: false,
            pause_reason: None,
            linked_vision_id: None,
            linked_path_id: None,
            created_at: Utc::now().timestamp(),
        };
        queries::insert_habit(conn, &habit).unwrap();
        habit
    }

    #[test]
    fn marking_today_starts_a_streak() {
        let mut conn = open_test_db();
        seed_habit(&conn, Frequency::Daily);
        let today = d("2024-03-10");

        let habit =
            record_completion(&mut conn, "user-1", "habit-1", today, true, None, today).unwrap();

        assert_eq!(habit.streak, 1);
        assert_eq!(habit.longest_streak, 1);
    }

    #[test]
    fn remarking_a_completed_day_is_idempotent() {
        let mut conn = open_test_db();
        seed_habit(&conn, Frequency::Daily);
        let today = d("2024-03-10");

        record_completion(&mut conn, "user-1", "habit-1", today, true, None, today).unwrap();
        let habit =
            record_completion(&mut conn, "user-1", "habit-1", today, true, None, today).unwrap();

        assert_eq!(habit.streak, 1);
    }

    #[test]
    fn unmarking_the_most_recent_day_decrements_by_one() {
        let mut conn = open_test_db();
        seed_habit(&conn, Frequency::Daily);

        for day in ["2024-03-08", "2024-03-09", "2024-03-10"] {
            record_completion(&mut conn, "user-1", "habit-1", d(day), true, None, d(day)).unwrap();
        }

        let today = d("2024-03-10");
        let habit =
            record_completion(&mut conn, "user-1", "habit-1", today, false, None, today).unwrap();

        assert_eq!(habit.streak, 2);
        // The ratchet keeps the best run.
        assert_eq!(habit.longest_streak, 3);
    }

    #[test]
    fn backfilling_a_past_day_recomputes_from_history() {
        let mut conn = open_test_db();
        seed_habit(&conn, Frequency::Daily);
        let today = d("2024-03-11");

        record_completion(&mut conn, "user-1", "habit-1", d("2024-03-10"), true, None, d("2024-03-10")).unwrap();
        record_completion(&mut conn, "user-1", "habit-1", d("2024-03-11"), true, None, today).unwrap();

        // Unmark the older day: the run now reaches back only one day.
        let habit = record_completion(
            &mut conn, "user-1", "habit-1", d("2024-03-10"), false, None, today,
        )
        .unwrap();
        assert_eq!(habit.streak, 1);

        // Backfill it again: the recount restores the full run.
        let habit = record_completion(
            &mut conn, "user-1", "habit-1", d("2024-03-10"), true, None, today,
        )
        .unwrap();
        assert_eq!(habit.streak, 2);
    }

    #[test]
    fn uncompleted_today_does_not_break_the_run() {
        let mut conn = open_test_db();
        seed_habit(&conn, Frequency::Daily);

        record_completion(&mut conn, "user-1", "habit-1", d("2024-03-09"), true, None, d("2024-03-09")).unwrap();
        record_completion(&mut conn, "user-1", "habit-1", d("2024-03-10"), true, None, d("2024-03-10")).unwrap();

        // Next morning, before today's completion, a backfill elsewhere
        // triggers a recompute; yesterday's run must survive.
        let habit = record_completion(
            &mut conn, "user-1", "habit-1", d("2024-03-08"), true, None, d("2024-03-11"),
        )
        .unwrap();
        assert_eq!(habit.streak, 3);
    }

    #[test]
    fn longest_streak_never_drops_below_current() {
        let mut conn = open_test_db();
        seed_habit(&conn, Frequency::Daily);

        let mut day = d("2024-03-01");
        for _ in 0..5 {
            let habit =
                record_completion(&mut conn, "user-1", "habit-1", day, true, None, day).unwrap();
            assert!(habit.longest_streak >= habit.streak);
            day = day + Days::new(1);
        }
    }

    #[test]
    fn weekday_habit_streak_skips_weekends() {
        let mut conn = open_test_db();
        seed_habit(&conn, Frequency::Weekdays);

        // Friday, then Monday: consecutive qualifying days.
        record_completion(&mut conn, "user-1", "habit-1", d("2024-03-08"), true, None, d("2024-03-08")).unwrap();
        let habit = record_completion(
            &mut conn, "user-1", "habit-1", d("2024-03-11"), true, None, d("2024-03-11"),
        )
        .unwrap();

        assert_eq!(habit.streak, 2);
    }

    #[test]
    fn zero_expected_occurrences_yields_zero_rate() {
        let conn = open_test_db();
        let habit = Habit {
            id: "h".into(),
            user_id: "u".into(),
            name: "Weekend hike".into(),
            frequency: Frequency::Weekends,
            time_of_day: TimeOfDay::Morning,
            streak: 0,
            longest_streak: 0,
            paused: false,
            pause_reason: None,
            linked_vision_id: None,
            linked_path_id: None,
            created_at: 0,
        };

        // Monday through Friday contains no weekend slots.
        let rate = completion_rate(&conn, &habit, d("2024-03-11"), d("2024-03-15")).unwrap();
        assert_eq!(rate, 0);
    }

    #[test]
    fn expected_occurrences_per_frequency() {
        // 2024-03-04 is a Monday; two full weeks.
        let start = d("2024-03-04");
        let end = d("2024-03-17");

        assert_eq!(expected_occurrences(Frequency::Daily, start, end), 14);
        assert_eq!(expected_occurrences(Frequency::Weekdays, start, end), 10);
        assert_eq!(expected_occurrences(Frequency::Weekends, start, end), 4);
        assert_eq!(expected_occurrences(Frequency::TimesPerWeek(3), start, end), 6);
        assert_eq!(expected_occurrences(Frequency::Daily, end, start), 0);
    }

    #[test]
    fn completion_rate_counts_frequency_slots() {
        let mut conn = open_test_db();
        let habit = seed_habit(&conn, Frequency::Daily);

        // 3 of 7 days completed.
        for day in ["2024-03-10", "2024-03-12", "2024-03-14"] {
            record_completion(&mut conn, "user-1", "habit-1", d(day), true, None, d("2024-03-16")).unwrap();
        }

        let rate = completion_rate(&conn, &habit, d("2024-03-10"), d("2024-03-16")).unwrap();
        assert_eq!(rate, 43); // 3/7 rounded
    }
}
