use chrono::Utc;
use rusqlite::Connection;

use crate::database::queries;
use crate::error::AppResult;
use crate::models::GrowthSummary;

/// Composite 0-100 engagement metric: visions x10, habits x5, average
/// current streak x2, check-ins x1, clamped at 100.
pub fn growth_score(visions: u32, habits: u32, avg_streak: f64, check_ins: u32) -> u32 {
    let raw = visions as f64 * 10.0 + habits as f64 * 5.0 + avg_streak * 2.0 + check_ins as f64;
    (raw.round() as u32).min(100)
}

/// Assembles the analytics overview for a user.
pub fn growth_summary(conn: &Connection, user_id: &str) -> AppResult<GrowthSummary> {
    let visions = queries::list_active_visions(conn, user_id)?;
    let habits = queries::list_habits(conn, user_id)?;
    let check_ins = queries::count_check_ins(conn, user_id)?;

    let longest_streak = habits.iter().map(|h| h.longest_streak).max().unwrap_or(0);
    let avg_streak = if habits.is_empty() {
        0.0
    } else {
        habits.iter().map(|h| h.streak as f64).sum::<f64>() / habits.len() as f64
    };

    let days_on_ascend = match queries::profile_created_at(conn, user_id)? {
        Some(created_at) => {
            let elapsed = Utc::now().timestamp() - created_at;
            (elapsed / 86_400).max(0) as u32
        }
        None => 0,
    };

    Ok(GrowthSummary {
        total_visions: visions.len() as u32,
        total_habits: habits.len() as u32,
        overall_completion_rate: (avg_streak * 10.0).round().max(0.0) as u32,
        longest_streak,
        total_check_ins: check_ins,
        days_on_ascend,
        growth_score: growth_score(visions.len() as u32, habits.len() as u32, avg_streak, check_ins),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn weighted_sum_below_the_clamp_is_exact() {
        // 3 visions, 5 habits, avg streak 4, 10 check-ins: 30+25+8+10.
        assert_eq!(growth_score(3, 5, 4.0, 10), 73);
    }

    #[test]
    fn empty_account_scores_zero() {
        assert_eq!(growth_score(0, 0, 0.0, 0), 0);
    }

    #[test]
    fn score_clamps_at_one_hundred() {
        assert_eq!(growth_score(20, 40, 365.0, 1000), 100);
    }

    proptest! {
        #[test]
        fn score_never_exceeds_one_hundred(
            visions in 0u32..10_000,
            habits in 0u32..10_000,
            avg_streak in 0.0f64..100_000.0,
            check_ins in 0u32..1_000_000,
        ) {
            prop_assert!(growth_score(visions, habits, avg_streak, check_ins) <= 100);
        }
    }
}
