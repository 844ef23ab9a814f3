pub mod anthropic;
pub mod mistral;
pub mod openai;

pub use anthropic::{
    AnthropicErrorBody, AnthropicMessage, AnthropicMessagesRequest, AnthropicMessagesResponse,
};
pub use mistral::MistralErrorBody;
pub use openai::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, OpenaiErrorBody};
