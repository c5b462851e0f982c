use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    Sad,
    Anxious,
    Neutral,
    Happy,
    Joyful,
    Excited,
}

impl Mood {
    /// 1-5 score used by the mood/energy trend series.
    pub fn score(&self) -> u8 {
        match self {
            Mood::Sad => 1,
            Mood::Anxious => 2,
            Mood::Neutral => 3,
            Mood::Happy => 4,
            Mood::Joyful | Mood::Excited => 5,
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Mood::Sad => "Sad",
            Mood::Anxious => "Anxious",
            Mood::Neutral => "Neutral",
            Mood::Happy => "Happy",
            Mood::Joyful => "Joyful",
            Mood::Excited => "Excited",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Sad" => Ok(Mood::Sad),
            "Anxious" => Ok(Mood::Anxious),
            "Neutral" => Ok(Mood::Neutral),
            "Happy" => Ok(Mood::Happy),
            "Joyful" => Ok(Mood::Joyful),
            "Excited" => Ok(Mood::Excited),
            other => Err(format!("unknown mood: {}", other)),
        }
    }
}

/// One daily mindfulness entry; at most one per user per calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub energy: u8,
    pub mood: Mood,
    pub gratitude: String,
    pub challenge: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInRequest {
    pub energy: u8,
    pub mood: Mood,
    pub gratitude: String,
    pub challenge: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub mood: u8,
    pub energy: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrendSummary {
    pub points: Vec<TrendPoint>,
    pub avg_mood: f32,
    pub avg_energy: f32,
}
