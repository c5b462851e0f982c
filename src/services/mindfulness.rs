use std::collections::HashSet;

use chrono::{Days, NaiveDate, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::database::queries;
use crate::error::{AppError, AppResult};
use crate::models::{CheckIn, CheckInRequest, TrendPoint, TrendSummary};

/// How far back the streak walk will look.
const STREAK_FETCH_LIMIT: u32 = 30;

/// Validates and stores today's check-in. At most one row exists per
/// (user, day); re-submitting the same day overwrites it.
pub fn submit_check_in(
    conn: &Connection,
    user_id: &str,
    request: &CheckInRequest,
    today: NaiveDate,
) -> AppResult<CheckIn> {
    if request.gratitude.trim().is_empty() {
        return Err(AppError::validation(
            "gratitude",
            "write something you're grateful for",
        ));
    }
    if !(1..=5).contains(&request.energy) {
        return Err(AppError::validation("energy", "must be between 1 and 5"));
    }

    let check_in = CheckIn {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        date: today,
        energy: request.energy,
        mood: request.mood,
        gratitude: request.gratitude.trim().to_string(),
        challenge: request
            .challenge
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from),
        created_at: Utc::now().timestamp(),
    };

    queries::upsert_check_in(conn, &check_in)?;
    // On a same-day overwrite the stored row keeps its original id.
    Ok(queries::get_check_in(conn, user_id, today)?.unwrap_or(check_in))
}

/// Consecutive days with a check-in, counted backward from `today`. The
/// walk stops at the first missing day, so no check-in today means 0 even
/// when older history exists.
pub fn check_in_streak(conn: &Connection, user_id: &str, today: NaiveDate) -> AppResult<u32> {
    let dates: HashSet<NaiveDate> =
        queries::recent_check_in_dates(conn, user_id, STREAK_FETCH_LIMIT)?
            .into_iter()
            .collect();

    let mut streak = 0u32;
    for offset in 0..STREAK_FETCH_LIMIT as u64 {
        let expected = today - Days::new(offset);
        if dates.contains(&expected) {
            streak += 1;
        } else {
            break;
        }
    }

    Ok(streak)
}

/// Mood/energy series over the trailing `range_days` (7 or 30 on the
/// trends screen), with averages.
pub fn mood_energy_trends(
    conn: &Connection,
    user_id: &str,
    range_days: u32,
    today: NaiveDate,
) -> AppResult<TrendSummary> {
    let start = today - Days::new(range_days.saturating_sub(1) as u64);
    let check_ins = queries::check_ins_since(conn, user_id, start)?;

    let points: Vec<TrendPoint> = check_ins
        .iter()
        .map(|ci| TrendPoint {
            date: ci.date,
            mood: ci.mood.score(),
            energy: ci.energy,
        })
        .collect();

    let (avg_mood, avg_energy) = if points.is_empty() {
        (0.0, 0.0)
    } else {
        let n = points.len() as f32;
        (
            points.iter().map(|p| p.mood as f32).sum::<f32>() / n,
            points.iter().map(|p| p.energy as f32).sum::<f32>() / n,
        )
    };

    Ok(TrendSummary {
        points,
        avg_mood,
        avg_energy,
    })
}
