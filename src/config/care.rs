use serde::{Deserialize, Serialize};

/// Rule-engine tunables.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CareConfig {
    /// TTL for cached watering assessments, in seconds.
    /// TOML: `care.assessment_cache_ttl_secs`. Default: `300`.
    #[serde(default = "default_assessment_cache_ttl_secs")]
    pub assessment_cache_ttl_secs: u64,

    /// Maximum number of cached assessments.
    /// TOML: `care.assessment_cache_capacity`. Default: `4096`.
    #[serde(default = "default_assessment_cache_capacity")]
    pub assessment_cache_capacity: u64,

    /// Number of recent readings fed into trend/anomaly analysis.
    /// TOML: `care.warning_window`. Default: `12`.
    #[serde(default = "default_warning_window")]
    pub warning_window: u32,

    /// Chat requests allowed per minute (per service key).
    /// TOML: `care.chat_rate_per_minute`. Default: `20`.
    #[serde(default = "default_chat_rate_per_minute")]
    pub chat_rate_per_minute: u32,
}

impl Default for CareConfig {
    fn default() -> Self {
        Self {
            assessment_cache_ttl_secs: default_assessment_cache_ttl_secs(),
            assessment_cache_capacity: default_assessment_cache_capacity(),
            warning_window: default_warning_window(),
            chat_rate_per_minute: default_chat_rate_per_minute(),
        }
    }
}

fn default_assessment_cache_ttl_secs() -> u64 {
    300
}

fn default_assessment_cache_capacity() -> u64 {
    4096
}

fn default_warning_window() -> u32 {
    12
}

fn default_chat_rate_per_minute() -> u32 {
    20
}
