//! CORS layer configuration.

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;

use etmf_core::config::CorsConfig;

/// Builds a CORS tower layer from configuration.
///
/// Requests carry the session cookie, so credentials are allowed and
/// origins are always listed explicitly.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(config.max_age_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_origin_is_ignored() {
        let config = CorsConfig {
            allowed_origins: vec!["*".into(), "https://tmf.example.org".into()],
            max_age_seconds: 60,
        };
        // Building must not panic on the credentials/wildcard combination.
        let _layer = build_cors_layer(&config);
    }
}
