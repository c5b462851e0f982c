use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Pattern,
    Prediction,
    Celebration,
    Suggestion,
}

impl std::fmt::Display for InsightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            InsightKind::Pattern => "pattern",
            InsightKind::Prediction => "prediction",
            InsightKind::Celebration => "celebration",
            InsightKind::Suggestion => "suggestion",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pattern" => Ok(InsightKind::Pattern),
            "prediction" => Ok(InsightKind::Prediction),
            "celebration" => Ok(InsightKind::Celebration),
            "suggestion" => Ok(InsightKind::Suggestion),
            other => Err(format!("unknown insight kind: {}", other)),
        }
    }
}

/// A generated observation about the user's behavior. Rows are append-only;
/// dismissal flips a flag and nothing is ever deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub user_id: String,
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub dismissed: bool,
    pub created_at: i64,
}
