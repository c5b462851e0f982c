use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub category: String,
    pub content: String,
    pub key_takeaways: Vec<String>,
    /// Estimated read time in minutes.
    pub read_time: u32,
}

/// A lesson as shown in the library list, with the caller's completion state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonItem {
    pub id: String,
    pub title: String,
    pub category: String,
    pub read_time: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LessonProgress {
    pub total: u32,
    pub completed: u32,
}
