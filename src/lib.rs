use axum::{
    http::{header, Method},
    middleware as axum_middleware,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod domains;
pub mod observability;
pub mod services;
pub mod state;

use api::create_api_router;
use api::health::monitoring_router;
use observability::metrics_middleware;
use state::AppState;

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

pub fn create_app_router(app_state: Arc<AppState>) -> Router {
    let request_timeout = Duration::from_secs(app_state.config.app.request_timeout_seconds);

    Router::new()
        // Health and Prometheus endpoints (no authentication)
        .merge(monitoring_router())
        .merge(create_api_router())
        .with_state(app_state)
        .layer(axum_middleware::from_fn(metrics_middleware))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}
