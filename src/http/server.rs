//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the protected application endpoints
//! - Wire the admission chain (rate limiter → bot detector → metrics recorder)
//! - Apply transport guards (timeout, body limit, tracing, CSP header)
//! - Serve the admin API on its own listener
//! - Graceful shutdown via the lifecycle broadcast

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::header::{self, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer, set_header::SetResponseHeaderLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::config::GatekeeperConfig;
use crate::gateway::SecurityGateway;
use crate::http::handlers;
use crate::observability::metrics::metrics_middleware;
use crate::observability::RequestMetrics;
use crate::security::bot_detection::bot_detection_middleware;
use crate::security::rate_limit::rate_limit_middleware;
use crate::security::{BotDetector, SlidingWindowLimiter};

/// Application state injected into middleware and handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatekeeperConfig>,
    pub limiter: Arc<SlidingWindowLimiter>,
    pub bot_detector: Arc<BotDetector>,
    pub request_metrics: Arc<RequestMetrics>,
    pub gateway: Arc<SecurityGateway>,
}

impl AppState {
    /// Build the shared gatekeeper state from a validated configuration.
    pub fn new(config: GatekeeperConfig) -> Self {
        let limiter = Arc::new(SlidingWindowLimiter::new(&config.rate_limit));
        let bot_detector = Arc::new(BotDetector::new(&config.bot_detection));
        let request_metrics = Arc::new(RequestMetrics::new(&config.metrics));
        let gateway = Arc::new(SecurityGateway::new(config.gateway.clone()));

        Self {
            config: Arc::new(config),
            limiter,
            bot_detector,
            request_metrics,
            gateway,
        }
    }
}

/// HTTP server for the gatekeeper.
pub struct GatekeeperServer {
    router: Router,
    state: AppState,
}

impl GatekeeperServer {
    /// Create a new server with the given configuration.
    pub fn new(config: GatekeeperConfig) -> Self {
        let state = AppState::new(config);
        let router = Self::build_router(&state);
        Self { router, state }
    }

    /// Shared state handle, mainly for tests and the binaries.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the application router with all middleware layers.
    ///
    /// Layers run outermost-first on the way in: trace → body limit →
    /// timeout → rate limiter → bot detector → metrics recorder → handler.
    /// Admission rejections therefore never reach the metrics recorder.
    fn build_router(state: &AppState) -> Router {
        let config = &state.config;

        let mut router = Router::new()
            .route("/login", post(handlers::login))
            .route("/search", post(handlers::search))
            .route("/view-log", get(handlers::view_log))
            .route("/upload", post(handlers::upload))
            .route("/register", post(handlers::register))
            .route("/rate-limit-test", get(handlers::rate_limit_test))
            .route("/healthz", get(handlers::healthz))
            .with_state(state.clone())
            .layer(middleware::from_fn_with_state(
                state.clone(),
                metrics_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                bot_detection_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_middleware,
            ))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TraceLayer::new_for_http());

        if config.gateway.enabled {
            router = router.layer(SetResponseHeaderLayer::if_not_present(
                header::CONTENT_SECURITY_POLICY,
                HeaderValue::from_static(crate::gateway::CSP_HEADER),
            ));
        }

        router
    }

    /// Run the server, accepting connections on the given listeners.
    ///
    /// `admin_listener` carries the admin API when the admin surface is
    /// enabled; binding is the caller's job so tests can use ephemeral ports.
    pub async fn run(
        self,
        listener: TcpListener,
        admin_listener: Option<TcpListener>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            rate_limiting = self.state.limiter.is_enabled(),
            bot_detection = self.state.bot_detector.is_enabled(),
            metrics = self.state.request_metrics.is_enabled(),
            "Gatekeeper starting"
        );

        if self.state.limiter.is_enabled() {
            Arc::clone(&self.state.limiter).spawn_idle_sweep(shutdown.resubscribe());
        }

        if let Some(admin_listener) = admin_listener {
            let admin_addr = admin_listener.local_addr()?;
            let admin_router = admin::admin_router(self.state.clone());
            let mut admin_shutdown = shutdown.resubscribe();

            tracing::info!(address = %admin_addr, "Admin API listening");
            tokio::spawn(async move {
                let served = axum::serve(admin_listener, admin_router.into_make_service())
                    .with_graceful_shutdown(async move {
                        let _ = admin_shutdown.recv().await;
                    })
                    .await;
                if let Err(e) = served {
                    tracing::error!(error = %e, "Admin server error");
                }
            });
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Gatekeeper stopped");
        Ok(())
    }
}
