use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// How often a habit is expected to be performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Frequency {
    Daily,
    Weekdays,
    Weekends,
    /// An explicit target of N completions per 7-day block.
    TimesPerWeek(u8),
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Daily
    }
}

impl Frequency {
    /// Whether `date` counts as an expected occurrence for this frequency.
    /// A per-week target has no fixed calendar slots, so every day qualifies.
    pub fn qualifies(&self, date: NaiveDate) -> bool {
        match self {
            Frequency::Daily | Frequency::TimesPerWeek(_) => true,
            Frequency::Weekdays => !matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
            Frequency::Weekends => matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Daily => write!(f, "Daily"),
            Frequency::Weekdays => write!(f, "Weekdays"),
            Frequency::Weekends => write!(f, "Weekends"),
            Frequency::TimesPerWeek(n) => write!(f, "{}x/week", n),
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Daily" => Ok(Frequency::Daily),
            "Weekdays" => Ok(Frequency::Weekdays),
            "Weekends" => Ok(Frequency::Weekends),
            other => other
                .strip_suffix("x/week")
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| *n >= 1 && *n <= 7)
                .map(Frequency::TimesPerWeek)
                .ok_or_else(|| format!("unknown frequency: {}", other)),
        }
    }
}

impl TryFrom<String> for Frequency {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Frequency> for String {
    fn from(f: Frequency) -> String {
        f.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl Default for TimeOfDay {
    fn default() -> Self {
        TimeOfDay::Morning
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Morning" => Ok(TimeOfDay::Morning),
            "Afternoon" => Ok(TimeOfDay::Afternoon),
            "Evening" => Ok(TimeOfDay::Evening),
            "Night" => Ok(TimeOfDay::Night),
            other => Err(format!("unknown time of day: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub frequency: Frequency,
    pub time_of_day: TimeOfDay,
    pub streak: u32,
    pub longest_streak: u32,
    pub paused: bool,
    pub pause_reason: Option<String>,
    pub linked_vision_id: Option<String>,
    pub linked_path_id: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitCompletion {
    pub habit_id: String,
    pub date: NaiveDate,
    pub completed: bool,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHabitRequest {
    pub name: String,
    pub frequency: Frequency,
    pub time_of_day: TimeOfDay,
    pub linked_vision_id: Option<String>,
    pub linked_path_id: Option<String>,
}

/// Rolling completion rates for the standard detail-screen windows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct RateSummary {
    pub seven_day: u32,
    pub thirty_day: u32,
    pub ninety_day: u32,
}
