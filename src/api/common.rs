use axum::http::{header::AUTHORIZATION, HeaderMap};
use serde::Serialize;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub request_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub execution_time_ms: Option<u64>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, request_id: String, execution_time_ms: Option<u64>) -> Self {
        Self {
            success: true,
            data: Some(data),
            request_id,
            timestamp: chrono::Utc::now(),
            execution_time_ms,
        }
    }
}

/// `x-request-id` from the caller, or a fresh one.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(shared::utils::generate_request_id)
}

/// Reddit access token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
