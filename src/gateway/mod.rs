//! Validation/sanitization gateway.
//!
//! # Data Flow
//! ```text
//! Application handler receives untrusted input:
//!     → validator.rs (field shape predicates)
//!     → sanitize.rs (HTML entity escaping)
//!     → path.rs (canonicalization + containment)
//!     → SecurityGateway (facade the handlers call)
//! ```
//!
//! # Design Decisions
//! - Every check is a pure function; invalid input yields `false` or escaped
//!   text, never a fault
//! - Path resolution is the one operation that touches the filesystem, and
//!   every failure there is reported as a rejection
//! - The credential check is a stand-in boundary: it compares opaque values
//!   and is the seam where a real credential store plugs in

pub mod path;
pub mod sanitize;
pub mod validator;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::GatewayConfig;

/// Content-Security-Policy attached to protected responses.
pub const CSP_HEADER: &str =
    "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline';";

/// Stand-in credentials for the placeholder authenticator.
const DEMO_USERNAME: &str = "admin";
const DEMO_PASSWORD: &str = "admin123";

/// Errors surfaced by the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A filename failed the lexical gate, escaped its base directory, or
    /// could not be canonicalized.
    #[error("path rejected: {0:?}")]
    PathTraversal(String),

    /// An I/O fault while persisting data to an already-resolved path.
    #[error("file operation failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Facade composing the validators, the sanitizer, and the path resolver
/// into the entry points application handlers call.
pub struct SecurityGateway {
    config: GatewayConfig,
}

impl SecurityGateway {
    /// Create a gateway from its configuration section.
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    /// Whether the gateway reports itself active on the status surface.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Login check that never interpolates its inputs into a query.
    ///
    /// The username must pass the shape validator; the credential comparison
    /// itself treats both values as opaque. The fixed literals are a
    /// documented stand-in for a real credential store.
    pub fn validate_login(&self, username: &str, password: &str) -> bool {
        if !validator::is_valid_username(username) {
            return false;
        }
        self.authenticate(username, password)
    }

    fn authenticate(&self, username: &str, password: &str) -> bool {
        username == DEMO_USERNAME && password == DEMO_PASSWORD
    }

    /// Escape untrusted text for HTML interpolation.
    pub fn sanitize_xss(&self, input: &str) -> String {
        sanitize::sanitize_html(input)
    }

    /// Resolve a log filename against the configured log directory.
    pub fn resolve_log_path(&self, filename: &str) -> Result<PathBuf, GatewayError> {
        path::resolve_path(filename, Path::new(&self.config.log_dir))
    }

    /// True iff `size` is positive and within `max`.
    pub fn validate_file_size(&self, size: u64, max: u64) -> bool {
        size > 0 && size <= max
    }

    /// Maximum accepted upload size in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.config.max_upload_bytes
    }

    /// Directory uploads are written to.
    pub fn upload_dir(&self) -> &Path {
        Path::new(&self.config.upload_dir)
    }

    pub fn validate_email(&self, email: &str) -> bool {
        validator::is_valid_email(email)
    }

    pub fn validate_password(&self, password: &str) -> bool {
        validator::is_valid_password(password)
    }

    pub fn validate_username(&self, username: &str) -> bool {
        validator::is_valid_username(username)
    }

    /// Content-Security-Policy header value for protected responses.
    pub fn csp_header(&self) -> &'static str {
        CSP_HEADER
    }
}
