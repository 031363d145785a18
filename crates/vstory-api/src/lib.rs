//! Axum HTTP API server.
//!
//! This crate provides:
//! - The upload endpoint and per-mode dispatch (inline, staged, queued)
//! - Job and video status polling endpoints
//! - Health, stats, and Prometheus metrics

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, DispatchMode};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
