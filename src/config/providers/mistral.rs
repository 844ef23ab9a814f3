use serde::{Deserialize, Serialize};
use url::Url;

use super::{ProviderDefaults, openai::resolve_api_key};

/// Mistral chat provider configuration managed by Figment.
///
/// Mistral's endpoint is OpenAI-compatible; only base URL, default model and
/// the error envelope differ.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MistralConfig {
    /// API key. TOML: `providers.mistral.api_key`.
    /// Falls back to the `MISTRAL_API_KEY` environment variable when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    /// TOML: `providers.mistral.base_url`. Default: `https://api.mistral.ai/v1`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// TOML: `providers.mistral.model`.
    #[serde(default = "default_model")]
    pub model: String,

    /// TOML: `providers.mistral.temperature`. Default: `0.7`.
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
pub struct MistralResolvedConfig {
    pub api_key: Option<String>,
    pub base_url: Url,
    pub model: String,
    pub temperature: f32,
    pub proxy: Option<Url>,
    pub enable_multiplexing: bool,
    pub retry_max_times: usize,
    pub max_tokens: u32,
}

impl MistralConfig {
    pub fn resolve(&self, defaults: &ProviderDefaults) -> MistralResolvedConfig {
        MistralResolvedConfig {
            api_key: resolve_api_key(self.api_key.as_deref(), "MISTRAL_API_KEY"),
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

impl Default for MistralConfig {
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
    Url::parse("https://api.mistral.ai/v1").expect("invalid default mistral base url")
}

fn default_model() -> String {
    "mistral-small-latest".to_string()
}

fn default_temperature() -> f32 {
    0.7
}
