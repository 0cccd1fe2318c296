pub mod common;
pub mod health;
pub mod menu_v1; // Moderator menu actions
pub mod settings_v1;
pub mod widgets_v1; // Widget session lifecycle

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// Creates the API router with all REST endpoints
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api/v1/widgets", widgets_v1::create_router())
        .nest("/api/v1/menu", menu_v1::create_router())
        .nest("/api/v1/settings", settings_v1::create_router())
}
