//! Request metrics aggregation and exposition.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde::Serialize;

use crate::config::schema::MetricsConfig;
use crate::http::server::AppState;

/// Mutable aggregate state. Lives behind an [`ArcSwap`] so a reset replaces
/// the whole struct at once: a reader holding the old pointer sees a fully
/// consistent pre-reset aggregate, never a partially zeroed one.
#[derive(Default)]
struct MetricsInner {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    total_response_time_ms: AtomicU64,
    status_codes: DashMap<u16, u64>,
    endpoint_latency_ms: DashMap<String, u64>,
}

/// Serializable point-in-time view of the aggregate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub average_response_time: u64,
    pub total_response_time: u64,
    /// Percentage, rounded to two decimal places.
    pub success_rate: f64,
    pub status_code_distribution: BTreeMap<String, u64>,
}

/// Process-wide request metrics aggregate.
pub struct RequestMetrics {
    inner: ArcSwap<MetricsInner>,
    enabled: bool,
}

impl RequestMetrics {
    pub fn new(config: &MetricsConfig) -> Self {
        Self {
            inner: ArcSwap::from_pointee(MetricsInner::default()),
            enabled: config.enabled,
        }
    }

    /// Whether metrics collection is active for this process.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record one completed request.
    ///
    /// A status in `[200, 300)` counts as successful, anything else as
    /// failed; `total == successful + failed` holds after every call.
    pub fn record_completion(&self, endpoint: &str, status: u16, elapsed_ms: u64) {
        let inner = self.inner.load();

        inner.total_requests.fetch_add(1, Ordering::Relaxed);
        inner
            .total_response_time_ms
            .fetch_add(elapsed_ms, Ordering::Relaxed);
        *inner.status_codes.entry(status).or_insert(0) += 1;

        if (200..300).contains(&status) {
            inner.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            inner.failed_requests.fetch_add(1, Ordering::Relaxed);
        }

        inner
            .endpoint_latency_ms
            .insert(endpoint.to_string(), elapsed_ms);
    }

    pub fn total_requests(&self) -> u64 {
        self.inner.load().total_requests.load(Ordering::Relaxed)
    }

    pub fn successful_requests(&self) -> u64 {
        self.inner.load().successful_requests.load(Ordering::Relaxed)
    }

    pub fn failed_requests(&self) -> u64 {
        self.inner.load().failed_requests.load(Ordering::Relaxed)
    }

    /// Integer-truncated mean latency; zero requests yields zero, not a
    /// division fault.
    pub fn average_response_time_ms(&self) -> u64 {
        let inner = self.inner.load();
        let total = inner.total_requests.load(Ordering::Relaxed);
        if total == 0 {
            0
        } else {
            inner.total_response_time_ms.load(Ordering::Relaxed) / total
        }
    }

    /// Success percentage; zero requests yields 0.0.
    pub fn success_rate(&self) -> f64 {
        let inner = self.inner.load();
        let total = inner.total_requests.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            inner.successful_requests.load(Ordering::Relaxed) as f64 * 100.0 / total as f64
        }
    }

    /// Last-seen latency per endpoint path.
    pub fn endpoint_latency_ms(&self, endpoint: &str) -> Option<u64> {
        self.inner
            .load()
            .endpoint_latency_ms
            .get(endpoint)
            .map(|v| *v)
    }

    /// Consistent point-in-time snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.load();

        let total = inner.total_requests.load(Ordering::Relaxed);
        let successful = inner.successful_requests.load(Ordering::Relaxed);
        let failed = inner.failed_requests.load(Ordering::Relaxed);
        let total_time = inner.total_response_time_ms.load(Ordering::Relaxed);

        let average = if total == 0 { 0 } else { total_time / total };
        let rate = if total == 0 {
            0.0
        } else {
            successful as f64 * 100.0 / total as f64
        };

        MetricsSnapshot {
            total_requests: total,
            successful_requests: successful,
            failed_requests: failed,
            average_response_time: average,
            total_response_time: total_time,
            success_rate: (rate * 100.0).round() / 100.0,
            status_code_distribution: inner
                .status_codes
                .iter()
                .map(|entry| (entry.key().to_string(), *entry.value()))
                .collect(),
        }
    }

    /// Human-readable report block.
    pub fn render_text(&self) -> String {
        let snapshot = self.snapshot();

        let mut out = String::new();
        out.push_str("=== BENCHMARK METRICS ===\n");
        out.push_str(&format!("Total Requests: {}\n", snapshot.total_requests));
        out.push_str(&format!(
            "Successful Requests: {}\n",
            snapshot.successful_requests
        ));
        out.push_str(&format!("Failed Requests: {}\n", snapshot.failed_requests));
        out.push_str(&format!(
            "Average Response Time: {}ms\n",
            snapshot.average_response_time
        ));
        out.push_str(&format!(
            "Total Response Time: {}ms\n",
            snapshot.total_response_time
        ));
        out.push_str("\nStatus Code Distribution:\n");
        for (code, count) in &snapshot.status_code_distribution {
            out.push_str(&format!("  {}: {}\n", code, count));
        }
        out
    }

    /// Administrative reset. Swaps in a zeroed aggregate; concurrent readers
    /// observe either the old state in full or the new one, nothing between.
    pub fn reset(&self) {
        self.inner.store(Arc::new(MetricsInner::default()));
    }
}

/// Middleware recording each completed request, on the aggregate and on the
/// exposition layer. Sits innermost in the admission chain, so short-circuited
/// rejections never land here.
pub async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.request_metrics.is_enabled() {
        return next.run(request).await;
    }

    let start = Instant::now();
    let endpoint = request.uri().path().to_string();
    let method = request.method().to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = start.elapsed().as_millis() as u64;
    state
        .request_metrics
        .record_completion(&endpoint, status, elapsed_ms);
    record_request(&method, status, start);

    response
}

/// Install the Prometheus scrape endpoint. Must run inside the Tokio runtime.
pub fn init_exporter(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install Prometheus exporter"),
    }
}

/// Record one completed request on the exposition layer.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "gatekeeper_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gatekeeper_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

/// Record a rate-limit rejection on the exposition layer.
pub fn record_rate_limited(reason: &str) {
    metrics::counter!("gatekeeper_rate_limited_total", "reason" => reason.to_string()).increment(1);
}

/// Record a bot rejection on the exposition layer.
pub fn record_bot_blocked() {
    metrics::counter!("gatekeeper_bots_blocked_total").increment(1);
}
