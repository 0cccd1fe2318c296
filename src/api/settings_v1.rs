use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::api::common::{request_id, ApiResponse};
use crate::domains::settings::{setting_definitions, SettingDefinition};
use crate::state::AppState;

pub fn create_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_settings))
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub definitions: Vec<SettingDefinition>,
    /// Effective values of the public settings. Secrets are never echoed.
    pub default_upvotes: i64,
}

/// GET /api/v1/settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<ApiResponse<SettingsResponse>> {
    let response = SettingsResponse {
        definitions: setting_definitions(),
        default_upvotes: state.config.widget.default_balance,
    };
    Json(ApiResponse::success(response, request_id(&headers), None))
}
