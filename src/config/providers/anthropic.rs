use serde::{Deserialize, Serialize};
use url::Url;

use super::{ProviderDefaults, openai::resolve_api_key};

/// Value of the required `anthropic-version` request header.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API provider configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnthropicConfig {
    /// API key. TOML: `providers.anthropic.api_key`.
    /// Falls back to the `ANTHROPIC_API_KEY` environment variable when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    /// TOML: `providers.anthropic.base_url`. Default: `https://api.anthropic.com`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// TOML: `providers.anthropic.model`.
    #[serde(default = "default_model")]
    pub model: String,

    /// TOML: `providers.anthropic.temperature`. Default: `0.7`.
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
pub struct AnthropicResolvedConfig {
    pub api_key: Option<String>,
    pub base_url: Url,
    pub model: String,
    pub temperature: f32,
    pub proxy: Option<Url>,
    pub enable_multiplexing: bool,
    pub retry_max_times: usize,
    pub max_tokens: u32,
}

impl AnthropicConfig {
    pub fn resolve(&self, defaults: &ProviderDefaults) -> AnthropicResolvedConfig {
        AnthropicResolvedConfig {
            api_key: resolve_api_key(self.api_key.as_deref(), "ANTHROPIC_API_KEY"),
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

impl Default for AnthropicConfig {
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

fn default_base_url() -> Url {
    Url::parse("https://api.anthropic.com").expect("invalid default anthropic base url")
}

fn default_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_temperature() -> f32 {
    0.7
}
