// ============================================================================
// PROMETHEUS METRICS
// ============================================================================
// Request, ledger and widget metrics exposed on /metrics
// ============================================================================

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge, HistogramVec,
    IntCounterVec, IntGauge,
};

lazy_static! {
    // ========================================================================
    // HTTP REQUEST METRICS
    // ========================================================================

    /// HTTP requests by method, endpoint and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "endpoint", "status"]
    )
    .unwrap();

    /// HTTP request latency in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "endpoint"],
        vec![0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // ========================================================================
    // LEDGER METRICS
    // ========================================================================

    pub static ref LEDGER_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "ledger_operations_total",
        "Balance ledger operations by kind and outcome",
        &["operation", "status"]
    )
    .unwrap();

    pub static ref LEDGER_OPERATION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "ledger_operation_duration_seconds",
        "Balance ledger operation duration in seconds",
        &["operation"],
        vec![0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500]
    )
    .unwrap();

    // ========================================================================
    // WIDGET METRICS
    // ========================================================================

    /// Community directory lookups (info, styles)
    pub static ref COMMUNITY_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "community_lookups_total",
        "Community directory lookups by kind and outcome",
        &["lookup", "status"]
    )
    .unwrap();

    pub static ref WIDGET_SESSIONS_ACTIVE: IntGauge = register_int_gauge!(
        "widget_sessions_active",
        "Number of mounted widget sessions"
    )
    .unwrap();

    pub static ref WIDGET_TOASTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "widget_toasts_total",
        "Toast notifications emitted",
        &["source"]
    )
    .unwrap();
}

fn status_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}

/// Records one HTTP request
pub fn record_http_request(method: &str, endpoint: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, endpoint])
        .observe(duration_secs);
}

pub fn record_ledger_operation(operation: &str, success: bool, duration_secs: f64) {
    LEDGER_OPERATIONS_TOTAL
        .with_label_values(&[operation, status_label(success)])
        .inc();

    LEDGER_OPERATION_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration_secs);
}

pub fn record_community_lookup(lookup: &str, success: bool) {
    COMMUNITY_LOOKUPS_TOTAL
        .with_label_values(&[lookup, status_label(success)])
        .inc();
}

pub fn record_toast(source: &str) {
    WIDGET_TOASTS_TOTAL.with_label_values(&[source]).inc();
}

pub fn set_active_sessions(count: usize) {
    WIDGET_SESSIONS_ACTIVE.set(count as i64);
}
