//! Plant-care chatbot: prompt construction and the rule-based responder used
//! when no upstream provider is available.

pub mod fallback;
pub mod prompt;

pub use fallback::{FallbackIntent, compose_fallback_reply, detect_intent};
pub use prompt::build_system_prompt;

/// Source tag recorded for assistant turns answered without an upstream model.
pub const RULE_BASED_SOURCE: &str = "rule-based";
