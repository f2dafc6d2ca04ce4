//! Pluggable HTTP request gatekeeper.
//!
//! An ordered chain of independent security checks interposed between an
//! inbound request and the handler that serves it, plus the shared
//! validation gateway the handlers call.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                   GATEKEEPER                      │
//!                    │                                                   │
//!  Client Request    │  ┌────────────┐   ┌────────────┐   ┌──────────┐  │
//!  ──────────────────┼─▶│ rate limit │──▶│ bot detect │──▶│ metrics  │  │
//!                    │  │ (sliding   │   │ (signature │   │ recorder │  │
//!                    │  │  window)   │   │  table)    │   └────┬─────┘  │
//!                    │  └─────┬──────┘   └─────┬──────┘        │        │
//!                    │    429 │            403 │               ▼        │
//!                    │        ▼                ▼         ┌──────────┐   │
//!                    │   short-circuit   short-circuit   │ handlers │   │
//!                    │                                   └────┬─────┘   │
//!                    │                                        │         │
//!                    │              ┌─────────────────────────┘         │
//!                    │              ▼                                   │
//!                    │  ┌─────────────────────────────────────────┐     │
//!                    │  │          validation gateway             │     │
//!                    │  │  validators · sanitizer · path resolver │     │
//!                    │  └─────────────────────────────────────────┘     │
//!                    │                                                   │
//!                    │  Admin API (own listener): status, metrics,       │
//!                    │  bot counter, administrative resets               │
//!                    └──────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod gateway;
pub mod http;
pub mod security;

// Cross-cutting concerns
pub mod admin;
pub mod lifecycle;
pub mod observability;

pub use config::GatekeeperConfig;
pub use http::GatekeeperServer;
pub use lifecycle::Shutdown;
