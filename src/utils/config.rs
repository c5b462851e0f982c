use std::path::{Path, PathBuf};

use crate::models::Settings;

const ENV_API_KEY: &str = "ASCEND_API_KEY";
const ENV_DATA_DIR: &str = "ASCEND_DATA_DIR";

pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

pub fn api_key_from_env() -> Option<String> {
    std::env::var(ENV_API_KEY)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// An explicit key wins; otherwise the environment key, otherwise empty.
pub fn resolve_api_key(explicit_key: &str) -> String {
    let trimmed = explicit_key.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    api_key_from_env().unwrap_or_default()
}

pub fn apply_env_defaults(settings: &mut Settings) {
    if settings.ai.api_key.trim().is_empty() {
        settings.ai.api_key = api_key_from_env().unwrap_or_default();
    }
}

pub fn data_dir() -> PathBuf {
    std::env::var(ENV_DATA_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config").join("settings.json")
}

/// Settings from `config/settings.json` under the data dir, with defaults
/// for anything missing and the API key filled from the environment.
pub fn load_settings(data_dir: &Path) -> Settings {
    let path = settings_path(data_dir);
    let mut settings = std::fs::read_to_string(&path)
        .ok()
        .and_then(|content| serde_json::from_str::<Settings>(&content).ok())
        .unwrap_or_default();
    apply_env_defaults(&mut settings);
    settings
}

pub fn save_settings(data_dir: &Path, settings: &Settings) -> anyhow::Result<()> {
    let path = settings_path(data_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, serde_json::to_string_pretty(settings)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_key_beats_environment() {
        assert_eq!(resolve_api_key("  sk-explicit  "), "sk-explicit");
    }

    #[test]
    fn settings_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();

        let mut settings = Settings::default();
        settings.general.timezone = "Europe/Berlin".to_string();
        settings.insights.interval_mins = 15;
        save_settings(dir.path(), &settings).unwrap();

        let loaded = load_settings(dir.path());
        assert_eq!(loaded.general.timezone, "Europe/Berlin");
        assert_eq!(loaded.insights.interval_mins, 15);
    }

    #[test]
    fn missing_settings_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(dir.path());
        assert_eq!(settings.version, "1.0.0");
        assert_eq!(settings.general.timezone, "UTC");
    }
}
