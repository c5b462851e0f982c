pub mod coach;
pub mod growth;
pub mod insight_engine;
pub mod mindfulness;
pub mod streak_engine;
