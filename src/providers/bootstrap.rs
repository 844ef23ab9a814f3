use crate::config::{AnthropicResolvedConfig, Config, MistralResolvedConfig, OpenaiResolvedConfig};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// A chat backend the failover chain knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Openai,
    Mistral,
    Anthropic,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Openai => "openai",
            ProviderKind::Mistral => "mistral",
            ProviderKind::Anthropic => "anthropic",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::Openai),
            "mistral" => Ok(ProviderKind::Mistral),
            "anthropic" => Ok(ProviderKind::Anthropic),
            _ => Err(()),
        }
    }
}

/// Aggregates resolved configuration for all chat providers.
///
/// Keep this as a simple struct (vs. a dynamic registry) to preserve
/// compile-time ergonomics and avoid over-abstracting too early.
#[derive(Clone)]
pub struct Providers {
    pub openai_cfg: Arc<OpenaiResolvedConfig>,
    pub mistral_cfg: Arc<MistralResolvedConfig>,
    pub anthropic_cfg: Arc<AnthropicResolvedConfig>,
    /// Failover order; unknown names from config were dropped at build time.
    pub priority: Vec<ProviderKind>,
}

impl Providers {
    pub fn from_config(cfg: &Config) -> Self {
        let defaults = &cfg.providers.defaults;
        let openai_cfg = Arc::new(cfg.openai());
        let mistral_cfg = Arc::new(cfg.mistral());
        let anthropic_cfg = Arc::new(cfg.anthropic());

        let mut priority = Vec::new();
        for name in &cfg.providers.priority {
            match name.parse::<ProviderKind>() {
                Ok(kind) if !priority.contains(&kind) => priority.push(kind),
                Ok(_) => {}
                Err(()) => warn!(provider = %name, "Unknown provider in priority list; ignoring"),
            }
        }

        // Log resolved provider configs here so `main` stays wiring-only.
        info!(
            providers_defaults_proxy = %defaults.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
            providers_defaults_enable_multiplexing = defaults.enable_multiplexing,
            providers_defaults_retry_max_times = defaults.retry_max_times,
            providers_defaults_max_tokens = defaults.max_tokens,
            priority = ?priority.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
            "Provider defaults loaded"
        );
        info!(
            openai_configured = openai_cfg.api_key.is_some(),
            openai_base_url = %openai_cfg.base_url.as_str(),
            openai_model = %openai_cfg.model,
            openai_retry_max_times = openai_cfg.retry_max_times,
            "OpenAI config (effective)"
        );
        info!(
            mistral_configured = mistral_cfg.api_key.is_some(),
            mistral_base_url = %mistral_cfg.base_url.as_str(),
            mistral_model = %mistral_cfg.model,
            mistral_retry_max_times = mistral_cfg.retry_max_times,
            "Mistral config (effective)"
        );
        info!(
            anthropic_configured = anthropic_cfg.api_key.is_some(),
            anthropic_base_url = %anthropic_cfg.base_url.as_str(),
            anthropic_model = %anthropic_cfg.model,
            anthropic_retry_max_times = anthropic_cfg.retry_max_times,
            "Anthropic config (effective)"
        );

        Self {
            openai_cfg,
            mistral_cfg,
            anthropic_cfg,
            priority,
        }
    }

    /// Names of providers that hold an API key, in failover order.
    pub fn configured_names(&self) -> Vec<&'static str> {
        self.priority
            .iter()
            .filter(|kind| match kind {
                ProviderKind::Openai => self.openai_cfg.api_key.is_some(),
                ProviderKind::Mistral => self.mistral_cfg.api_key.is_some(),
                ProviderKind::Anthropic => self.anthropic_cfg.api_key.is_some(),
            })
            .map(|kind| kind.as_str())
            .collect()
    }
}
