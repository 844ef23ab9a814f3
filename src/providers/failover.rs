//! Ordered failover across chat backends.
//!
//! The chain never fails a chat request outright: callers treat an exhausted
//! chain as the signal to answer rule-based.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::providers::backend::{ChatBackend, ChatTurn, CompletionOutput};

#[derive(Clone)]
pub struct ChatRouter {
    backends: Vec<Arc<dyn ChatBackend>>,
}

impl ChatRouter {
    pub fn new(backends: Vec<Arc<dyn ChatBackend>>) -> Self {
        Self { backends }
    }

    /// Names of backends holding an API key, in failover order.
    pub fn configured_names(&self) -> Vec<&'static str> {
        self.backends
            .iter()
            .filter(|b| b.is_configured())
            .map(|b| b.name())
            .collect()
    }

    pub fn has_configured_backend(&self) -> bool {
        self.backends.iter().any(|b| b.is_configured())
    }

    /// Try each configured backend in order; `None` means the chain is
    /// exhausted (or empty) and the caller should fall back to rules.
    pub async fn complete(&self, system: &str, turns: &[ChatTurn]) -> Option<CompletionOutput> {
        for backend in &self.backends {
            if !backend.is_configured() {
                debug!(provider = backend.name(), "Skipping unconfigured backend");
                continue;
            }

            match backend.complete(system, turns).await {
                Ok(output) => {
                    debug!(
                        provider = output.provider,
                        model = %output.model,
                        "Chat completion served by upstream"
                    );
                    return Some(output);
                }
                Err(err) => {
                    warn!(
                        provider = backend.name(),
                        error = %err,
                        "Backend failed; trying next in chain"
                    );
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use async_trait::async_trait;

    struct StaticBackend {
        name: &'static str,
        configured: bool,
        reply: Option<&'static str>,
    }

    #[async_trait]
    impl ChatBackend for StaticBackend {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn complete(
            &self,
            _system: &str,
            _turns: &[ChatTurn],
        ) -> Result<CompletionOutput, ChatError> {
            match self.reply {
                Some(text) => Ok(CompletionOutput {
                    text: text.to_string(),
                    model: "static".to_string(),
                    provider: self.name,
                    usage: None,
                }),
                None => Err(ChatError::EmptyCompletion {
                    provider: self.name,
                }),
            }
        }
    }

    #[tokio::test]
    async fn failover_skips_unconfigured_and_failing_backends() {
        let router = ChatRouter::new(vec![
            Arc::new(StaticBackend {
                name: "first",
                configured: false,
                reply: Some("never called"),
            }),
            Arc::new(StaticBackend {
                name: "second",
                configured: true,
                reply: None,
            }),
            Arc::new(StaticBackend {
                name: "third",
                configured: true,
                reply: Some("hello"),
            }),
        ]);

        let out = router
            .complete("sys", &[ChatTurn::user("hi")])
            .await
            .expect("expected a completion");
        assert_eq!(out.provider, "third");
        assert_eq!(out.text, "hello");
        assert_eq!(router.configured_names(), vec!["second", "third"]);
    }

    #[tokio::test]
    async fn exhausted_chain_returns_none() {
        let router = ChatRouter::new(vec![Arc::new(StaticBackend {
            name: "only",
            configured: true,
            reply: None,
        })]);

        assert!(router.complete("sys", &[]).await.is_none());

        let empty = ChatRouter::new(Vec::new());
        assert!(!empty.has_configured_backend());
        assert!(empty.complete("sys", &[]).await.is_none());
    }
}
