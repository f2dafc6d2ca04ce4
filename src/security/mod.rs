//! Admission control subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (sliding window per client key)
//!     → bot_detection.rs (User-Agent signature check)
//!     → Pass to the metrics recorder and the handler
//! ```
//!
//! # Design Decisions
//! - Rejections are routine outcomes, not faults: counted, logged, never fatal
//! - Either check short-circuits with a fixed rejection body
//! - Both checks are per-process; behind multiple instances each enforces
//!   independently

pub mod bot_detection;
pub mod rate_limit;

pub use bot_detection::{BotDetector, Classification};
pub use rate_limit::SlidingWindowLimiter;
