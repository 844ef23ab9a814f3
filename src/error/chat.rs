use axum::http::StatusCode;
use thiserror::Error as ThisError;

use super::IsRetryable;

/// Failures raised by the chat provider backends.
///
/// `Status` carries the classified upstream status plus a short body excerpt
/// for logs; transport and parse failures keep their source errors.
#[derive(Debug, ThisError)]
pub enum ChatError {
    #[error("[{provider}] upstream status {status}: {detail}")]
    Status {
        provider: &'static str,
        status: StatusCode,
        detail: String,
    },

    #[error("[{provider}] upstream returned no completion text")]
    EmptyCompletion { provider: &'static str },

    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream payload parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ChatError {
    pub fn provider(&self) -> Option<&'static str> {
        match self {
            ChatError::Status { provider, .. } | ChatError::EmptyCompletion { provider } => {
                Some(provider)
            }
            ChatError::Transport(_) | ChatError::Parse(_) => None,
        }
    }
}

impl IsRetryable for ChatError {
    fn is_retryable(&self) -> bool {
        match self {
            ChatError::Transport(_) => true,
            ChatError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            ChatError::EmptyCompletion { .. } | ChatError::Parse(_) => false,
        }
    }
}
