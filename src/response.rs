//! Success response envelope shared by every endpoint.

use serde::Serialize;

use crate::extractors::Json;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

/// Wrap `data` in the standard `{success: true, data, message}` envelope.
pub fn ok<T: Serialize>(data: T, message: &str) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
        message: message.to_string(),
    })
}
