//! Axum HTTP/WS server for video-to-GIF conversion.
//!
//! This crate provides:
//! - The `/convert` multipart upload endpoint
//! - A WebSocket push channel broadcasting conversion progress
//! - Static serving of the client page and generated GIFs
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod ws;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{Converter, ProgressHub, StampGenerator, StorageLayout};
pub use state::AppState;
