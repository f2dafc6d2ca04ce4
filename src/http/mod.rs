//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware chain)
//!     → client_key.rs (rate-limit identity for the request)
//!     → [admission: rate limiter, bot detector]
//!     → handlers.rs (gateway-protected application endpoints)
//!     → metrics recorder observes the outcome
//! ```

pub mod client_key;
pub mod handlers;
pub mod server;

pub use server::{AppState, GatekeeperServer};
