//! Custom Axum extractors.

pub mod auth;

pub use auth::{AuthUser, client_ip, user_agent};
