use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use crate::state::AppState;

/// Health, probe and metrics endpoints (no authentication)
pub fn monitoring_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
        .route("/metrics", get(prometheus_metrics))
}

/// Health check including the balance store
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let start_time = Instant::now();
    let store = match state.store.ping().await {
        Ok(()) => serde_json::json!({
            "status": "healthy",
            "last_ping_duration_ms": start_time.elapsed().as_millis() as u64,
        }),
        Err(e) => {
            error!("Balance store health check failed: {}", e);
            serde_json::json!({ "status": "unhealthy", "error": e.to_string() })
        }
    };
    let healthy = store["status"] == "healthy";
    let overall_status = if healthy { "healthy" } else { "degraded" };

    let health = serde_json::json!({
        "status": overall_status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": "upv_widget",
        "environment": state.config.app.environment,
        "store": store,
        "active_sessions": state.sessions.len(),
    });

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(health))
}

/// Readiness probe
async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.store.ping().await.is_ok() {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Not Ready")
    }
}

/// Liveness probe
async fn liveness_check() -> impl IntoResponse {
    (StatusCode::OK, "Alive")
}

/// Prometheus text exposition
async fn prometheus_metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let mut buffer = vec![];

    match encoder.encode(&prometheus::gather(), &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [(CONTENT_TYPE, encoder.format_type().to_string())],
            buffer,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}
