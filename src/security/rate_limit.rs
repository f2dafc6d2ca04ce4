//! Sliding-window rate limiting middleware.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::RateLimitConfig;
use crate::http::client_key::client_key;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Body sent with every 429.
const RATE_LIMITED_BODY: &str = "Rate limit exceeded\n";

/// Per-client sliding-window admission control.
///
/// Each client key owns an ordered queue of admission timestamps, pruned to
/// the trailing window on every check. The map entry guard makes the
/// fetch/evict/test/append sequence atomic per key; distinct keys only
/// contend on shard collisions.
pub struct SlidingWindowLimiter {
    windows: DashMap<String, VecDeque<Instant>>,
    window: Duration,
    max_requests: usize,
    sweep_interval: Duration,
    idle_after: Duration,
    enabled: bool,
}

impl SlidingWindowLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let window = Duration::from_millis(config.window_ms);
        Self {
            windows: DashMap::new(),
            window,
            max_requests: config.max_requests,
            sweep_interval: Duration::from_secs(config.idle_sweep_interval_secs),
            idle_after: window * config.idle_evict_after_windows,
            enabled: config.enabled,
        }
    }

    /// Whether rate limiting is active for this process.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Admission check for one request from `key`. Infallible; the result is
    /// the admit/deny decision.
    pub fn admit(&self, key: &str) -> bool {
        self.admit_at(key, Instant::now())
    }

    /// Deterministic core of [`admit`]: evict timestamps older than
    /// `now - window`, then admit iff the remaining count is under capacity.
    /// A denied request does not append.
    pub fn admit_at(&self, key: &str, now: Instant) -> bool {
        let mut window = self
            .windows
            .entry(key.to_string())
            .or_insert_with(VecDeque::new);

        // Timestamps are ascending by construction, so eviction is a prefix
        // trim. checked_sub covers clocks younger than the window.
        if let Some(cutoff) = now.checked_sub(self.window) {
            while window.front().is_some_and(|t| *t < cutoff) {
                window.pop_front();
            }
        }

        if window.len() < self.max_requests {
            window.push_back(now);
            true
        } else {
            false
        }
    }

    /// Drop keys whose newest admission is older than the idle horizon.
    ///
    /// Returns the number of keys removed.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let Some(cutoff) = now.checked_sub(self.idle_after) else {
            return 0;
        };
        let before = self.windows.len();
        self.windows
            .retain(|_, window| window.back().is_some_and(|t| *t >= cutoff));
        before.saturating_sub(self.windows.len())
    }

    /// Number of client keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Spawn the background idle-key sweep, stopping on shutdown.
    pub fn spawn_idle_sweep(
        self: Arc<Self>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let limiter = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(limiter.sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = limiter.evict_idle(Instant::now());
                        if removed > 0 {
                            tracing::debug!(
                                evicted_keys = removed,
                                tracked_keys = limiter.tracked_keys(),
                                "Swept idle rate limit windows"
                            );
                        }
                    }
                    _ = shutdown.recv() => break,
                }
            }
        })
    }
}

/// Middleware enforcing the sliding window per client key.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.limiter.is_enabled() {
        return next.run(request).await;
    }

    let key = client_key(request.headers(), addr);
    if state.limiter.admit(&key) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, "Rate limit exceeded");
        metrics::record_rate_limited("window_capacity");
        let mut response = Response::new(Body::from(RATE_LIMITED_BODY));
        *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
        response
    }
}
