//! Admin API handlers: toggle status, metrics reads, and resets.
//!
//! Everything here is read-only against the shared gatekeeper state except
//! the two explicit reset operations, which are idempotent.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::http::server::AppState;
use crate::observability::MetricsSnapshot;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub rate_limiting_enabled: bool,
    pub bot_detection_enabled: bool,
    pub metrics_enabled: bool,
    pub gateway_enabled: bool,
}

/// Full metrics report: the aggregate snapshot plus the bot counter.
#[derive(Serialize)]
pub struct MetricsReport {
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
    #[serde(rename = "botsDetected")]
    pub bots_detected: u64,
}

/// Toggle surface: which protections this process is running with.
pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        rate_limiting_enabled: state.limiter.is_enabled(),
        bot_detection_enabled: state.bot_detector.is_enabled(),
        metrics_enabled: state.request_metrics.is_enabled(),
        gateway_enabled: state.gateway.is_enabled(),
    })
}

pub async fn get_metrics(State(state): State<AppState>) -> Json<MetricsReport> {
    Json(MetricsReport {
        metrics: state.request_metrics.snapshot(),
        bots_detected: state.bot_detector.bot_count(),
    })
}

pub async fn get_metrics_text(State(state): State<AppState>) -> String {
    state.request_metrics.render_text()
}

pub async fn get_bot_count(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "botDetectionCount": state.bot_detector.bot_count() }))
}

pub async fn reset_bot_count(State(state): State<AppState>) -> Json<Value> {
    state.bot_detector.reset_bot_count();
    tracing::info!("Bot detection count reset");
    Json(json!({ "status": "success", "message": "Bot detection count reset" }))
}

/// Resets the request aggregate and the bot counter together.
pub async fn reset_metrics(State(state): State<AppState>) -> Json<Value> {
    state.request_metrics.reset();
    state.bot_detector.reset_bot_count();
    tracing::info!("All metrics reset");
    Json(json!({ "status": "success", "message": "All metrics reset" }))
}
