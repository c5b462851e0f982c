use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub version: String,
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub ai: AiSettings,
    #[serde(default)]
    pub insights: InsightSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            general: GeneralSettings::default(),
            ai: AiSettings::default(),
            insights: InsightSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// IANA timezone name used to resolve "today" for streaks and check-ins.
    pub timezone: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSettings {
    pub enabled: bool,
    pub provider: String,
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: "nvidia".to_string(),
            api_key: String::new(),
            model: "moonshotai/kimi-k2-instruct-0905".to_string(),
            endpoint: "https://integrate.api.nvidia.com/v1/chat/completions".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightSettings {
    pub enabled: bool,
    /// Minutes between background generation passes.
    pub interval_mins: u64,
    /// Seconds to wait after startup before the first pass.
    pub startup_delay_secs: u64,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_mins: 30,
            startup_delay_secs: 60,
        }
    }
}
