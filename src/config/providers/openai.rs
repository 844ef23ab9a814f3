use serde::{Deserialize, Serialize};
use url::Url;

use super::ProviderDefaults;

/// OpenAI chat provider configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenaiConfig {
    /// API key. TOML: `providers.openai.api_key`.
    /// Falls back to the `OPENAI_API_KEY` environment variable when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Chat completions base URL (the `/chat/completions` path is appended).
    /// TOML: `providers.openai.base_url`. Default: `https://api.openai.com/v1`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Model sent upstream. TOML: `providers.openai.model`.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature. TOML: `providers.openai.temperature`. Default: `0.7`.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Optional upstream HTTP proxy; falls back to `providers.defaults.proxy`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Falls back to `providers.defaults.enable_multiplexing`.
    #[serde(default)]
    pub enable_multiplexing: Option<bool>,

    /// Falls back to `providers.defaults.retry_max_times`.
    #[serde(default)]
    pub retry_max_times: Option<usize>,

    /// Falls back to `providers.defaults.max_tokens`.
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct OpenaiResolvedConfig {
    pub api_key: Option<String>,
    pub base_url: Url,
    pub model: String,
    pub temperature: f32,
    pub proxy: Option<Url>,
    pub enable_multiplexing: bool,
    pub retry_max_times: usize,
    pub max_tokens: u32,
}

impl OpenaiConfig {
    pub fn resolve(&self, defaults: &ProviderDefaults) -> OpenaiResolvedConfig {
        OpenaiResolvedConfig {
            api_key: resolve_api_key(self.api_key.as_deref(), "OPENAI_API_KEY"),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            proxy: self.proxy.clone().or_else(|| defaults.proxy.clone()),
            enable_multiplexing: self
                .enable_multiplexing
                .unwrap_or(defaults.enable_multiplexing),
            retry_max_times: self.retry_max_times.unwrap_or(defaults.retry_max_times),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
        }
    }
}

impl Default for OpenaiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            proxy: None,
            enable_multiplexing: None,
            retry_max_times: None,
            max_tokens: None,
        }
    }
}

/// TOML value first, then the environment; empty strings count as unset.
pub(super) fn resolve_api_key(configured: Option<&str>, env_var: &str) -> Option<String> {
    configured
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .filter(|key| !key.trim().is_empty())
}

fn default_base_url() -> Url {
    Url::parse("https://api.openai.com/v1").expect("invalid default openai base url")
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}
