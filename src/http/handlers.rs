//! Application endpoints behind the admission pipeline.
//!
//! Every handler funnels untrusted input through the gateway before acting
//! on it. These are the protected request paths; the admission middleware
//! has already run by the time a handler executes.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use crate::gateway::GatewayError;
use crate::http::server::AppState;

/// Header carrying the client-chosen filename for uploads.
pub const X_FILENAME: &str = "x-filename";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Login check; the gateway rejects malformed usernames before the
/// credential comparison runs.
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if state.gateway.validate_login(&form.username, &form.password) {
        tracing::info!(username = %form.username, "Login succeeded");
        (StatusCode::OK, format!("Welcome, {}\n", form.username)).into_response()
    } else {
        tracing::warn!(username = %form.username, "Login failed");
        (StatusCode::UNAUTHORIZED, "Login failed\n").into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub query: String,
}

/// Echoes the query back escaped; the reflected-content path the sanitizer
/// exists for.
pub async fn search(State(state): State<AppState>, Form(form): Form<SearchForm>) -> Response {
    let result = format!("{} - Search result", state.gateway.sanitize_xss(&form.query));
    (StatusCode::OK, result).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ViewLogQuery {
    pub filename: String,
}

/// Serve a log file resolved through the traversal-safe resolver.
///
/// A resolution failure is a rejected request, never downgraded to "file
/// not found"; a read failure after a successful resolve is an operation
/// failure with a message.
pub async fn view_log(
    State(state): State<AppState>,
    Query(params): Query<ViewLogQuery>,
) -> Response {
    let path = match state.gateway.resolve_log_path(&params.filename) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!(filename = %params.filename, error = %e, "Log path rejected");
            return (StatusCode::BAD_REQUEST, format!("{}\n", e)).into_response();
        }
    };

    match tokio::fs::read_to_string(&path).await {
        Ok(content) => (StatusCode::OK, content).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unable to read file: {}\n", e),
        )
            .into_response(),
    }
}

/// Accept an upload, guarded by the filename validator and the size check.
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(filename) = headers
        .get(X_FILENAME)
        .and_then(|value| value.to_str().ok())
        .filter(|name| !name.is_empty())
    else {
        return (StatusCode::BAD_REQUEST, "Missing X-Filename header\n").into_response();
    };

    if !crate::gateway::validator::is_valid_filename(filename) {
        return (
            StatusCode::BAD_REQUEST,
            format!("{}\n", GatewayError::PathTraversal(filename.to_string())),
        )
            .into_response();
    }

    if body.is_empty() {
        return (StatusCode::BAD_REQUEST, "File is empty\n").into_response();
    }
    if !state
        .gateway
        .validate_file_size(body.len() as u64, state.gateway.max_upload_bytes())
    {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            "File size exceeds upload limit\n",
        )
            .into_response();
    }

    match persist_upload(&state, filename, &body).await {
        Ok(()) => {
            tracing::info!(filename, bytes = body.len(), "File uploaded");
            (StatusCode::OK, format!("File uploaded: {}\n", filename)).into_response()
        }
        Err(e) => {
            tracing::error!(filename, error = %e, "Upload failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Upload failed: {}\n", e),
            )
                .into_response()
        }
    }
}

/// Write the validated upload under the upload directory. The filename has
/// already passed the lexical gate, so joining it cannot escape the
/// directory; the directory itself is created on first use.
async fn persist_upload(
    state: &AppState,
    filename: &str,
    body: &Bytes,
) -> Result<(), GatewayError> {
    let dir = state.gateway.upload_dir().to_path_buf();
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(dir.join(filename), body).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub username: String,
}

/// Registration; all three field validators must pass.
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    if !state.gateway.validate_email(&form.email)
        || !state.gateway.validate_password(&form.password)
        || !state.gateway.validate_username(&form.username)
    {
        return (StatusCode::BAD_REQUEST, "Invalid input format\n").into_response();
    }

    (
        StatusCode::OK,
        format!("Registered user: {}\n", form.username),
    )
        .into_response()
}

/// Cheap probe endpoint for exercising the admission pipeline.
pub async fn rate_limit_test() -> &'static str {
    "OK\n"
}

/// Liveness probe.
pub async fn healthz() -> &'static str {
    "ok"
}
