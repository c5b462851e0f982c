use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisionCategory {
    Health,
    Career,
    Relationships,
    Finance,
    Learning,
    Lifestyle,
}

impl Default for VisionCategory {
    fn default() -> Self {
        VisionCategory::Lifestyle
    }
}

impl std::fmt::Display for VisionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            VisionCategory::Health => "Health",
            VisionCategory::Career => "Career",
            VisionCategory::Relationships => "Relationships",
            VisionCategory::Finance => "Finance",
            VisionCategory::Learning => "Learning",
            VisionCategory::Lifestyle => "Lifestyle",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for VisionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Health" => Ok(VisionCategory::Health),
            "Career" => Ok(VisionCategory::Career),
            "Relationships" => Ok(VisionCategory::Relationships),
            "Finance" => Ok(VisionCategory::Finance),
            "Learning" => Ok(VisionCategory::Learning),
            "Lifestyle" => Ok(VisionCategory::Lifestyle),
            other => Err(format!("unknown vision category: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vision {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: VisionCategory,
    pub color: Option<String>,
    /// 0-100, maintained outside the engines described here.
    pub health_score: u32,
    pub archived: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVisionRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: VisionCategory,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathStatus {
    #[serde(rename = "not-started")]
    NotStarted,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
}

impl Default for PathStatus {
    fn default() -> Self {
        PathStatus::NotStarted
    }
}

impl std::fmt::Display for PathStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PathStatus::NotStarted => "not-started",
            PathStatus::InProgress => "in-progress",
            PathStatus::Completed => "completed",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for PathStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not-started" => Ok(PathStatus::NotStarted),
            "in-progress" => Ok(PathStatus::InProgress),
            "completed" => Ok(PathStatus::Completed),
            other => Err(format!("unknown path status: {}", other)),
        }
    }
}

/// A milestone belonging to a vision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Path {
    pub id: String,
    pub vision_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: PathStatus,
    pub order_index: u32,
    pub depends_on_path_id: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePathRequest {
    pub vision_id: String,
    pub name: String,
    pub description: Option<String>,
    pub depends_on_path_id: Option<String>,
    pub deadline: Option<NaiveDate>,
}

/// A vision with its milestones, linked habits, and derived progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionDetail {
    pub vision: Vision,
    pub paths: Vec<Path>,
    pub habits: Vec<super::Habit>,
    /// completed paths / total paths, as an integer percent; 0 with no paths.
    pub progress: u32,
}
