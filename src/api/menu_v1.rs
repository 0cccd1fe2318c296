use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::utils::validation::normalize_community_name;
use shared::{AppError, Toast};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use crate::api::common::{bearer_token, request_id, ApiResponse};
use crate::domains::menu::{create_instance, menu_items, MenuItem};
use crate::domains::widget::ToastQueue;
use crate::services::platform::PostRef;
use crate::state::AppState;

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_menu_items))
        .route("/new-instance", post(new_instance))
}

#[derive(Debug, Deserialize)]
pub struct NewInstanceRequest {
    pub subreddit: String,
}

#[derive(Debug, Serialize)]
pub struct NewInstanceResponse {
    pub post: PostRef,
    pub toasts: Vec<Toast>,
}

/// GET /api/v1/menu
pub async fn list_menu_items(headers: HeaderMap) -> Json<ApiResponse<Vec<MenuItem>>> {
    Json(ApiResponse::success(menu_items(), request_id(&headers), None))
}

/// Moderator action: create a new widget post in a subreddit
/// POST /api/v1/menu/new-instance
pub async fn new_instance(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<NewInstanceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NewInstanceResponse>>), AppError> {
    let request_id = request_id(&headers);
    let start_time = Instant::now();

    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::authentication("Missing bearer token"))?;
    let community = normalize_community_name(&request.subreddit);
    if community.is_empty() {
        return Err(AppError::validation("subreddit is required"));
    }

    let platform = state.platform.connect(Some(&token));
    let toasts = ToastQueue::new();
    let post = create_instance(&platform, &community, &toasts)
        .await
        .map_err(|e| {
            warn!(community = %community, request_id = %request_id, "⚠️ New instance rejected: {}", e);
            e
        })?;

    let execution_time = start_time.elapsed().as_millis() as u64;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            NewInstanceResponse {
                post,
                toasts: toasts.drain(),
            },
            request_id,
            Some(execution_time),
        )),
    ))
}
