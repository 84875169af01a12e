//! Axum HTTP API server for YTPerf.
//!
//! This crate provides:
//! - The `/api/predict` multipart prediction endpoint
//! - Health, model-status and artifact-reload endpoints
//! - Request logging, request ids and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
