//! Admin/observability API.
//!
//! Served on its own listener, outside the admission chain: an instance
//! under rate-limit or bot pressure must stay observable, and administrative
//! resets are not application traffic.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

/// Build the authenticated admin router.
pub fn admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/metrics", get(get_metrics))
        .route("/admin/metrics/text", get(get_metrics_text))
        .route("/admin/bot-count", get(get_bot_count))
        .route("/admin/reset-bot-count", post(reset_bot_count))
        .route("/admin/reset-metrics", post(reset_metrics))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
        .with_state(state)
}
