// ============================================================================
// HTTP METRICS MIDDLEWARE
// ============================================================================

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::observability::record_http_request;

/// Records count and latency of every HTTP request.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let normalized_path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    record_http_request(
        &method,
        &normalized_path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

/// Collapses session ids so per-session routes share one label.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|seg| {
            if uuid::Uuid::parse_str(seg).is_ok() {
                ":id"
            } else {
                seg
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
