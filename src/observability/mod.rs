//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Admission middleware and handlers produce:
//!     → metrics.rs (request aggregate + exposition counters)
//!     → tracing events (structured log lines)
//!
//! Consumers:
//!     → Admin API (JSON snapshot, text block, resets)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Aggregate updates are atomic increments; no lock is held across a request
//! - Reset swaps the whole aggregate so readers never see a partial zeroing
//! - The exposition layer is fire-and-forget and never consulted by handlers

pub mod metrics;

pub use metrics::{MetricsSnapshot, RequestMetrics};
