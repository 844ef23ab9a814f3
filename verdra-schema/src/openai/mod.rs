pub mod chat_error;
pub mod chat_request;
pub mod chat_response;

pub use chat_error::{OpenaiErrorBody, OpenaiErrorObject};
pub use chat_request::{ChatCompletionRequest, ChatMessage};
pub use chat_response::{ChatChoice, ChatCompletionResponse, ChatUsage};
