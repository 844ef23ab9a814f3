use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error as ThisError;

use super::IsRetryable;
use super::chat::ChatError;

#[derive(Debug, ThisError)]
pub enum VerdraError {
    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Validation failed for `{field}`: {requirement}")]
    Validation {
        field: &'static str,
        requirement: String,
    },

    #[error("Plant {0} not found")]
    PlantNotFound(i64),

    #[error("Alert {0} not found")]
    AlertNotFound(i64),

    #[error("No sensor readings recorded for plant {0}")]
    NoSensorData(i64),

    #[error("Chat rate limit exceeded")]
    RateLimited,

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl VerdraError {
    pub fn validation(field: &'static str, requirement: impl Into<String>) -> Self {
        VerdraError::Validation {
            field,
            requirement: requirement.into(),
        }
    }
}

impl IntoResponse for VerdraError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            VerdraError::DatabaseError(_)
            | VerdraError::RactorError(_)
            | VerdraError::UnexpectedError(_)
            | VerdraError::IoError(_) => {
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ApiErrorObject {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                    details: None,
                };
                (status, body)
            }

            VerdraError::Validation { field, requirement } => {
                let status = StatusCode::BAD_REQUEST;
                let body = ApiErrorObject {
                    code: "VALIDATION_ERROR".to_string(),
                    message: format!("Invalid value for `{field}`."),
                    details: Some(Value::String(requirement)),
                };
                (status, body)
            }

            VerdraError::PlantNotFound(id) => {
                let status = StatusCode::NOT_FOUND;
                let body = ApiErrorObject {
                    code: "PLANT_NOT_FOUND".to_string(),
                    message: format!("Plant {id} does not exist."),
                    details: None,
                };
                (status, body)
            }

            VerdraError::AlertNotFound(id) => {
                let status = StatusCode::NOT_FOUND;
                let body = ApiErrorObject {
                    code: "ALERT_NOT_FOUND".to_string(),
                    message: format!("Alert {id} does not exist."),
                    details: None,
                };
                (status, body)
            }

            VerdraError::NoSensorData(id) => {
                let status = StatusCode::NOT_FOUND;
                let body = ApiErrorObject {
                    code: "NO_SENSOR_DATA".to_string(),
                    message: format!("No sensor readings recorded for plant {id}."),
                    details: None,
                };
                (status, body)
            }

            VerdraError::RateLimited => {
                let status = StatusCode::TOO_MANY_REQUESTS;
                let body = ApiErrorObject {
                    code: "RATE_LIMIT".to_string(),
                    message: "Too many chat requests; slow down.".to_string(),
                    details: None,
                };
                (status, body)
            }

            VerdraError::JsonError(_) | VerdraError::Chat(ChatError::Parse(_)) => {
                let status = StatusCode::BAD_GATEWAY;
                let body = ApiErrorObject {
                    code: "BAD_UPSTREAM_PAYLOAD".to_string(),
                    message: "Failed to parse upstream response.".to_string(),
                    details: None,
                };
                (status, body)
            }

            VerdraError::Chat(ChatError::Transport(_))
            | VerdraError::Chat(ChatError::EmptyCompletion { .. })
            | VerdraError::ReqwestError(_)
            | VerdraError::UrlError(_) => {
                let status = StatusCode::BAD_GATEWAY;
                let body = ApiErrorObject {
                    code: "UPSTREAM_ERROR".to_string(),
                    message: "Upstream service error.".to_string(),
                    details: None,
                };
                (status, body)
            }

            VerdraError::UpstreamStatus(code) | VerdraError::Chat(ChatError::Status { status: code, .. }) => {
                let (err_code, msg) = match code {
                    StatusCode::TOO_MANY_REQUESTS => {
                        ("RATE_LIMIT", "Upstream rate limit exceeded.")
                    }
                    StatusCode::UNAUTHORIZED => ("UNAUTHORIZED", "Upstream authentication failed."),
                    StatusCode::FORBIDDEN => ("FORBIDDEN", "Upstream permission denied."),
                    StatusCode::NOT_FOUND => ("NOT_FOUND", "Upstream resource not found."),
                    _ => ("UPSTREAM_ERROR", "An upstream error occurred."),
                };
                (
                    code,
                    ApiErrorObject {
                        code: err_code.to_string(),
                        message: msg.to_string(),
                        details: None,
                    },
                )
            }
        };
        (status, Json(ApiErrorBody::new(error_body))).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// `{"success": false, "error": {...}}`: the failure half of the API envelope.
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub success: bool,
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}

impl ApiErrorBody {
    pub fn new(inner: ApiErrorObject) -> Self {
        Self {
            success: false,
            inner,
        }
    }
}

impl IsRetryable for VerdraError {
    fn is_retryable(&self) -> bool {
        match self {
            VerdraError::ReqwestError(_) => true,
            VerdraError::Chat(e) => e.is_retryable(),
            VerdraError::UpstreamStatus(status) => matches!(
                *status,
                StatusCode::TOO_MANY_REQUESTS | StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE
            ),
            _ => false,
        }
    }
}
