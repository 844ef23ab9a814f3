use axum::Json;
use serde::Serialize;

/// `{"success": true, "data": ...}`: the success half of the API envelope.
#[derive(Debug, Serialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiEnvelope<T>> {
    Json(ApiEnvelope {
        success: true,
        data,
    })
}
