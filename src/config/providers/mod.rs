mod anthropic;
mod mistral;
mod openai;

pub use anthropic::{ANTHROPIC_VERSION, AnthropicConfig, AnthropicResolvedConfig};
pub use mistral::{MistralConfig, MistralResolvedConfig};
pub use openai::{OpenaiConfig, OpenaiResolvedConfig};

use serde::{Deserialize, Serialize};
use url::Url;

/// Global provider defaults (used when provider-level config is unset).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderDefaults {
    /// Optional upstream HTTP proxy. If set, used for reqwest clients.
    /// TOML: `providers.defaults.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Allow HTTP/2 multiplexing for reqwest clients; disabled forces HTTP/1.
    /// TOML: `providers.defaults.enable_multiplexing`. Default: `false`.
    #[serde(default = "default_enable_multiplexing")]
    pub enable_multiplexing: bool,

    /// Max retry attempts for upstream calls.
    /// TOML: `providers.defaults.retry_max_times`. Default: `3`.
    #[serde(default = "default_retry_max_times")]
    pub retry_max_times: usize,

    /// Token budget requested per completion when a provider has no override.
    /// TOML: `providers.defaults.max_tokens`. Default: `1024`.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ProviderDefaults {
    fn default() -> Self {
        Self {
            proxy: None,
            enable_multiplexing: default_enable_multiplexing(),
            retry_max_times: default_retry_max_times(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// All provider configurations.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    /// Global defaults for providers (overridden per provider if set).
    #[serde(default)]
    pub defaults: ProviderDefaults,

    /// Failover order. Unknown names are ignored; unconfigured providers are
    /// skipped at call time.
    /// TOML: `providers.priority`. Default: `["openai", "mistral", "anthropic"]`.
    #[serde(default = "default_priority")]
    pub priority: Vec<String>,

    /// OpenAI chat provider configuration.
    #[serde(default)]
    pub openai: OpenaiConfig,

    /// Mistral chat provider configuration (OpenAI-compatible endpoint).
    #[serde(default)]
    pub mistral: MistralConfig,

    /// Anthropic Messages API provider configuration.
    #[serde(default)]
    pub anthropic: AnthropicConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            defaults: ProviderDefaults::default(),
            priority: default_priority(),
            openai: OpenaiConfig::default(),
            mistral: MistralConfig::default(),
            anthropic: AnthropicConfig::default(),
        }
    }
}

fn default_enable_multiplexing() -> bool {
    false
}

fn default_retry_max_times() -> usize {
    3
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_priority() -> Vec<String> {
    vec![
        "openai".to_string(),
        "mistral".to_string(),
        "anthropic".to_string(),
    ]
}
