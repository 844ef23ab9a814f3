mod chat;
mod verdra;

pub use chat::ChatError;
pub use verdra::{ApiErrorBody, ApiErrorObject, VerdraError};

pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}
