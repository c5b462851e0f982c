use serde::{Deserialize, Serialize};

use super::TimeOfDay;

/// A habit as shown on the today screen, with its completion state for today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodayHabit {
    pub id: String,
    pub name: String,
    pub time_of_day: TimeOfDay,
    pub streak: u32,
    pub completed: bool,
}

/// The analytics overview: raw counts plus the composite growth score.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GrowthSummary {
    pub total_visions: u32,
    pub total_habits: u32,
    pub overall_completion_rate: u32,
    pub longest_streak: u32,
    pub total_check_ins: u32,
    pub days_on_ascend: u32,
    pub growth_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashboardOverview {
    pub today_completed: u32,
    pub today_total: u32,
    pub growth: GrowthSummary,
}
