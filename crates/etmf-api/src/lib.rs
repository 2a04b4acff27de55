//! # etmf-api
//!
//! HTTP API layer for the eTMF portal built on Axum.
//!
//! Provides the REST endpoints under `/api`, the cookie session extractor,
//! request logging and CORS middleware, DTOs, and the mapping from
//! [`AppError`](etmf_core::error::AppError) to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
