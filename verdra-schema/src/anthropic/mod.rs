pub mod messages_error;
pub mod messages_request;
pub mod messages_response;

pub use messages_error::{AnthropicErrorBody, AnthropicErrorObject};
pub use messages_request::{AnthropicMessage, AnthropicMessagesRequest};
pub use messages_response::{AnthropicContentBlock, AnthropicMessagesResponse, AnthropicUsage};
