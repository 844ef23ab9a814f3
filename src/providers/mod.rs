pub mod anthropic;
pub mod backend;
pub mod failover;
pub mod mistral;
pub mod openai;

mod bootstrap;
mod policy;
mod upstream_retry;

pub use backend::{ChatBackend, ChatTurn, CompletionOutput, TokenUsage, TurnRole};
pub use bootstrap::{ProviderKind, Providers};
pub use failover::ChatRouter;
pub use policy::{ActionForError, MappingAction, UPSTREAM_BODY_PREVIEW_CHARS};
