use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::{
    CheckIn, CoachMessage, Habit, HabitCompletion, Insight, Lesson, Path, Vision,
};

// ─── Habits ───

fn habit_from_row(row: &Row) -> rusqlite::Result<Habit> {
    Ok(Habit {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        frequency: row.get::<_, String>(3)?.parse().unwrap_or_default(),
        time_of_day: row.get::<_, String>(4)?.parse().unwrap_or_default(),
        streak: row.get(5)?,
        longest_streak: row.get(6)?,
        paused: row.get(7)?,
        pause_reason: row.get(8)?,
        linked_vision_id: row.get(9)?,
        linked_path_id: row.get(10)?,
        created_at: row.get(11)?,
    })
}

const HABIT_COLUMNS: &str = "id, user_id, name, frequency, time_of_day, streak, longest_streak,
                             paused, pause_reason, linked_vision_id, linked_path_id, created_at";

pub fn insert_habit(conn: &Connection, habit: &Habit) -> Result<()> {
    conn.execute(
        "INSERT INTO habits (id, user_id, name, frequency, time_of_day, streak, longest_streak,
                             paused, pause_reason, linked_vision_id, linked_path_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        rusqlite::params![
            habit.id,
            habit.user_id,
            habit.name,
            habit.frequency.to_string(),
            habit.time_of_day.to_string(),
            habit.streak,
            habit.longest_streak,
            habit.paused,
            habit.pause_reason,
            habit.linked_vision_id,
            habit.linked_path_id,
            habit.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_habit(conn: &Connection, user_id: &str, habit_id: &str) -> Result<Option<Habit>> {
    let habit = conn
        .query_row(
            &format!("SELECT {} FROM habits WHERE id = ?1 AND user_id = ?2", HABIT_COLUMNS),
            rusqlite::params![habit_id, user_id],
            habit_from_row,
        )
        .optional()?;
    Ok(habit)
}

pub fn list_habits(conn: &Connection, user_id: &str) -> Result<Vec<Habit>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM habits WHERE user_id = ?1 ORDER BY paused ASC, created_at ASC",
        HABIT_COLUMNS
    ))?;

    let habits = stmt
        .query_map([user_id], habit_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(habits)
}

pub fn habits_linked_to_vision(conn: &Connection, vision_id: &str) -> Result<Vec<Habit>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM habits WHERE linked_vision_id = ?1 ORDER BY created_at ASC",
        HABIT_COLUMNS
    ))?;

    let habits = stmt
        .query_map([vision_id], habit_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(habits)
}

pub fn update_habit_streak(
    conn: &Connection,
    habit_id: &str,
    streak: u32,
    longest_streak: u32,
) -> Result<()> {
    conn.execute(
        "UPDATE habits SET streak = ?1, longest_streak = ?2 WHERE id = ?3",
        rusqlite::params![streak, longest_streak, habit_id],
    )?;
    Ok(())
}

pub fn set_habit_paused(
    conn: &Connection,
    user_id: &str,
    habit_id: &str,
    paused: bool,
    reason: Option<&str>,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE habits SET paused = ?1, pause_reason = ?2 WHERE id = ?3 AND user_id = ?4",
        rusqlite::params![paused, reason, habit_id, user_id],
    )?;
    Ok(changed > 0)
}

/// Removes a habit and its entire completion ledger.
pub fn delete_habit(conn: &Connection, user_id: &str, habit_id: &str) -> Result<bool> {
    // Delete completions first, then the habit
    conn.execute(
        "DELETE FROM habit_completions WHERE habit_id = ?1",
        [habit_id],
    )?;
    let changed = conn.execute(
        "DELETE FROM habits WHERE id = ?1 AND user_id = ?2",
        rusqlite::params![habit_id, user_id],
    )?;
    Ok(changed > 0)
}

// ─── Completion ledger ───

/// The stored `completed` value for (habit, date), if any row exists.
pub fn completion_value(
    conn: &Connection,
    habit_id: &str,
    date: NaiveDate,
) -> Result<Option<bool>> {
    let value = conn
        .query_row(
            "SELECT completed FROM habit_completions WHERE habit_id = ?1 AND date = ?2",
            rusqlite::params![habit_id, date],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

/// Upsert keyed on (habit, date); the sole mutation path for the ledger.
pub fn upsert_completion(
    conn: &Connection,
    habit_id: &str,
    date: NaiveDate,
    completed: bool,
    note: Option<&str>,
) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "INSERT INTO habit_completions (habit_id, date, completed, note, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(habit_id, date) DO UPDATE SET
            completed = excluded.completed,
            note = excluded.note",
        rusqlite::params![habit_id, date, completed, note, now],
    )?;
    Ok(())
}

/// All dates marked completed for a habit, newest first.
pub fn completed_dates(conn: &Connection, habit_id: &str) -> Result<Vec<NaiveDate>> {
    let mut stmt = conn.prepare(
        "SELECT date FROM habit_completions
         WHERE habit_id = ?1 AND completed = 1
         ORDER BY date DESC",
    )?;

    let dates = stmt
        .query_map([habit_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(dates)
}

pub fn completions_between(
    conn: &Connection,
    habit_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<HabitCompletion>> {
    let mut stmt = conn.prepare(
        "SELECT habit_id, date, completed, note FROM habit_completions
         WHERE habit_id = ?1 AND date >= ?2 AND date <= ?3
         ORDER BY date DESC",
    )?;

    let completions = stmt
        .query_map(rusqlite::params![habit_id, start, end], |row| {
            Ok(HabitCompletion {
                habit_id: row.get(0)?,
                date: row.get(1)?,
                completed: row.get(2)?,
                note: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(completions)
}

pub fn count_completed_between(
    conn: &Connection,
    habit_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM habit_completions
         WHERE habit_id = ?1 AND date >= ?2 AND date <= ?3 AND completed = 1",
        rusqlite::params![habit_id, start, end],
        |row| row.get(0),
    )?;
    Ok(count)
}

// ─── Visions & paths ───

pub fn insert_vision(conn: &Connection, vision: &Vision) -> Result<()> {
    conn.execute(
        "INSERT INTO visions (id, user_id, title, description, category, color, health_score,
                              archived, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            vision.id,
            vision.user_id,
            vision.title,
            vision.description,
            vision.category.to_string(),
            vision.color,
            vision.health_score,
            vision.archived,
            vision.created_at,
        ],
    )?;
    Ok(())
}

fn vision_from_row(row: &Row) -> rusqlite::Result<Vision> {
    Ok(Vision {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category: row.get::<_, String>(4)?.parse().unwrap_or_default(),
        color: row.get(5)?,
        health_score: row.get(6)?,
        archived: row.get(7)?,
        created_at: row.get(8)?,
    })
}

const VISION_COLUMNS: &str =
    "id, user_id, title, description, category, color, health_score, archived, created_at";

pub fn get_vision(conn: &Connection, user_id: &str, vision_id: &str) -> Result<Option<Vision>> {
    let vision = conn
        .query_row(
            &format!("SELECT {} FROM visions WHERE id = ?1 AND user_id = ?2", VISION_COLUMNS),
            rusqlite::params![vision_id, user_id],
            vision_from_row,
        )
        .optional()?;
    Ok(vision)
}

pub fn list_active_visions(conn: &Connection, user_id: &str) -> Result<Vec<Vision>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM visions WHERE user_id = ?1 AND archived = 0 ORDER BY created_at ASC",
        VISION_COLUMNS
    ))?;

    let visions = stmt
        .query_map([user_id], vision_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(visions)
}

pub fn set_vision_archived(
    conn: &Connection,
    user_id: &str,
    vision_id: &str,
    archived: bool,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE visions SET archived = ?1 WHERE id = ?2 AND user_id = ?3",
        rusqlite::params![archived, vision_id, user_id],
    )?;
    Ok(changed > 0)
}

/// Removes a vision and its paths; linked habits keep existing with the
/// link cleared.
pub fn delete_vision(conn: &Connection, user_id: &str, vision_id: &str) -> Result<bool> {
    conn.execute(
        "UPDATE habits SET linked_vision_id = NULL WHERE linked_vision_id = ?1",
        [vision_id],
    )?;
    conn.execute("DELETE FROM paths WHERE vision_id = ?1", [vision_id])?;
    let changed = conn.execute(
        "DELETE FROM visions WHERE id = ?1 AND user_id = ?2",
        rusqlite::params![vision_id, user_id],
    )?;
    Ok(changed > 0)
}

fn path_from_row(row: &Row) -> rusqlite::Result<Path> {
    Ok(Path {
        id: row.get(0)?,
        vision_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        status: row.get::<_, String>(4)?.parse().unwrap_or_default(),
        order_index: row.get(5)?,
        depends_on_path_id: row.get(6)?,
        deadline: row.get(7)?,
        completed_at: row.get(8)?,
        created_at: row.get(9)?,
    })
}

const PATH_COLUMNS: &str = "id, vision_id, name, description, status, order_index,
                            depends_on_path_id, deadline, completed_at, created_at";

pub fn insert_path(conn: &Connection, path: &Path) -> Result<()> {
    conn.execute(
        "INSERT INTO paths (id, vision_id, name, description, status, order_index,
                            depends_on_path_id, deadline, completed_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![
            path.id,
            path.vision_id,
            path.name,
            path.description,
            path.status.to_string(),
            path.order_index,
            path.depends_on_path_id,
            path.deadline,
            path.completed_at,
            path.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_path(conn: &Connection, path_id: &str) -> Result<Option<Path>> {
    let path = conn
        .query_row(
            &format!("SELECT {} FROM paths WHERE id = ?1", PATH_COLUMNS),
            [path_id],
            path_from_row,
        )
        .optional()?;
    Ok(path)
}

pub fn list_paths(conn: &Connection, vision_id: &str) -> Result<Vec<Path>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM paths WHERE vision_id = ?1 ORDER BY order_index ASC, created_at ASC",
        PATH_COLUMNS
    ))?;

    let paths = stmt
        .query_map([vision_id], path_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(paths)
}

pub fn next_path_order_index(conn: &Connection, vision_id: &str) -> Result<u32> {
    let max: Option<u32> = conn.query_row(
        "SELECT MAX(order_index) FROM paths WHERE vision_id = ?1",
        [vision_id],
        |row| row.get(0),
    )?;
    Ok(max.map(|m| m + 1).unwrap_or(0))
}

pub fn set_path_order(conn: &Connection, path_id: &str, order_index: u32) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE paths SET order_index = ?1 WHERE id = ?2",
        rusqlite::params![order_index, path_id],
    )?;
    Ok(changed > 0)
}

pub fn update_path_status(
    conn: &Connection,
    path_id: &str,
    status: &crate::models::PathStatus,
    completed_at: Option<i64>,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE paths SET status = ?1, completed_at = ?2 WHERE id = ?3",
        rusqlite::params![status.to_string(), completed_at, path_id],
    )?;
    Ok(changed > 0)
}

// ─── Check-ins ───

pub fn upsert_check_in(conn: &Connection, check_in: &CheckIn) -> Result<()> {
    conn.execute(
        "INSERT INTO check_ins (id, user_id, date, energy, mood, gratitude, challenge, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(user_id, date) DO UPDATE SET
            energy = excluded.energy,
            mood = excluded.mood,
            gratitude = excluded.gratitude,
            challenge = excluded.challenge",
        rusqlite::params![
            check_in.id,
            check_in.user_id,
            check_in.date,
            check_in.energy,
            check_in.mood.to_string(),
            check_in.gratitude,
            check_in.challenge,
            check_in.created_at,
        ],
    )?;
    Ok(())
}

fn check_in_from_row(row: &Row) -> rusqlite::Result<CheckIn> {
    Ok(CheckIn {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: row.get(2)?,
        energy: row.get(3)?,
        mood: row.get::<_, String>(4)?.parse().unwrap_or(crate::models::Mood::Neutral),
        gratitude: row.get(5)?,
        challenge: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn get_check_in(
    conn: &Connection,
    user_id: &str,
    date: NaiveDate,
) -> Result<Option<CheckIn>> {
    let check_in = conn
        .query_row(
            "SELECT id, user_id, date, energy, mood, gratitude, challenge, created_at
             FROM check_ins WHERE user_id = ?1 AND date = ?2",
            rusqlite::params![user_id, date],
            check_in_from_row,
        )
        .optional()?;
    Ok(check_in)
}

/// Up to `limit` most recent check-in dates, newest first.
pub fn recent_check_in_dates(
    conn: &Connection,
    user_id: &str,
    limit: u32,
) -> Result<Vec<NaiveDate>> {
    let mut stmt = conn.prepare(
        "SELECT date FROM check_ins WHERE user_id = ?1 ORDER BY date DESC LIMIT ?2",
    )?;

    let dates = stmt
        .query_map(rusqlite::params![user_id, limit], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(dates)
}

pub fn check_ins_since(
    conn: &Connection,
    user_id: &str,
    start: NaiveDate,
) -> Result<Vec<CheckIn>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, date, energy, mood, gratitude, challenge, created_at
         FROM check_ins WHERE user_id = ?1 AND date >= ?2 ORDER BY date ASC",
    )?;

    let check_ins = stmt
        .query_map(rusqlite::params![user_id, start], check_in_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(check_ins)
}

pub fn count_check_ins(conn: &Connection, user_id: &str) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM check_ins WHERE user_id = ?1",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

// ─── Insights ───

/// Inserts unless an insight with the same dedup key already exists for the
/// user. Returns whether a row was written.
pub fn insert_insight(
    conn: &Connection,
    user_id: &str,
    kind: crate::models::InsightKind,
    title: &str,
    description: &str,
    dedup_key: &str,
) -> Result<bool> {
    let now = chrono::Utc::now().timestamp();
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO insights (id, user_id, insight_type, title, description, dedup_key, dismissed, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
        rusqlite::params![
            Uuid::new_v4().to_string(),
            user_id,
            kind.to_string(),
            title,
            description,
            dedup_key,
            now,
        ],
    )?;
    Ok(inserted > 0)
}

pub fn active_insights(conn: &Connection, user_id: &str) -> Result<Vec<Insight>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, insight_type, title, description, dismissed, created_at
         FROM insights
         WHERE user_id = ?1 AND dismissed = 0
         ORDER BY created_at DESC",
    )?;

    let insights = stmt
        .query_map([user_id], |row| {
            Ok(Insight {
                id: row.get(0)?,
                user_id: row.get(1)?,
                kind: row
                    .get::<_, String>(2)?
                    .parse()
                    .unwrap_or(crate::models::InsightKind::Pattern),
                title: row.get(3)?,
                description: row.get(4)?,
                dismissed: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(insights)
}

/// Dismissal only ever sets the flag; rows are never deleted.
pub fn dismiss_insight(conn: &Connection, user_id: &str, insight_id: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE insights SET dismissed = 1 WHERE id = ?1 AND user_id = ?2",
        rusqlite::params![insight_id, user_id],
    )?;
    Ok(changed > 0)
}

// ─── Lessons ───

pub fn list_lessons(conn: &Connection) -> Result<Vec<Lesson>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, category, content, key_takeaways, read_time
         FROM lessons ORDER BY created_at ASC",
    )?;

    let lessons = stmt
        .query_map([], |row| {
            let takeaways_json: Option<String> = row.get(4)?;
            let key_takeaways = takeaways_json
                .and_then(|j| serde_json::from_str(&j).ok())
                .unwrap_or_default();

            Ok(Lesson {
                id: row.get(0)?,
                title: row.get(1)?,
                category: row.get(2)?,
                content: row.get(3)?,
                key_takeaways,
                read_time: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(lessons)
}

pub fn get_lesson(conn: &Connection, lesson_id: &str) -> Result<Option<Lesson>> {
    let lesson = conn
        .query_row(
            "SELECT id, title, category, content, key_takeaways, read_time
             FROM lessons WHERE id = ?1",
            [lesson_id],
            |row| {
                let takeaways_json: Option<String> = row.get(4)?;
                Ok(Lesson {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    category: row.get(2)?,
                    content: row.get(3)?,
                    key_takeaways: takeaways_json
                        .and_then(|j| serde_json::from_str(&j).ok())
                        .unwrap_or_default(),
                    read_time: row.get(5)?,
                })
            },
        )
        .optional()?;
    Ok(lesson)
}

pub fn completed_lesson_ids(conn: &Connection, user_id: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT lesson_id FROM user_lessons WHERE user_id = ?1")?;

    let ids = stmt
        .query_map([user_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(ids)
}

/// Idempotent: marking a lesson complete twice leaves one row.
pub fn complete_lesson(conn: &Connection, user_id: &str, lesson_id: &str) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "INSERT OR IGNORE INTO user_lessons (user_id, lesson_id, completed_at)
         VALUES (?1, ?2, ?3)",
        rusqlite::params![user_id, lesson_id, now],
    )?;
    Ok(())
}

// ─── Coach conversation ───

pub fn insert_coach_message(
    conn: &Connection,
    user_id: &str,
    role: &str,
    content: &str,
) -> Result<CoachMessage> {
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "INSERT INTO coach_messages (user_id, role, content, created_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![user_id, role, content, now],
    )?;

    Ok(CoachMessage {
        id: conn.last_insert_rowid(),
        user_id: user_id.to_string(),
        role: role.to_string(),
        content: content.to_string(),
        created_at: now,
    })
}

pub fn coach_messages(conn: &Connection, user_id: &str, limit: u32) -> Result<Vec<CoachMessage>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, role, content, created_at FROM (
            SELECT id, user_id, role, content, created_at
            FROM coach_messages
            WHERE user_id = ?1
            ORDER BY id DESC
            LIMIT ?2
         ) ORDER BY id ASC",
    )?;

    let messages = stmt
        .query_map(rusqlite::params![user_id, limit], |row| {
            Ok(CoachMessage {
                id: row.get(0)?,
                user_id: row.get(1)?,
                role: row.get(2)?,
                content: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(messages)
}

// ─── Profiles ───

pub fn profile_created_at(conn: &Connection, user_id: &str) -> Result<Option<i64>> {
    let created = conn
        .query_row(
            "SELECT created_at FROM profiles WHERE id = ?1",
            [user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(created)
}

/// Every known user, for the background insight pass.
pub fn all_user_ids(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT id FROM profiles ORDER BY created_at ASC")?;

    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(ids)
}
