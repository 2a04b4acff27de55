//! eTMF Portal Server: electronic Trial Master File
//!
//! Main entry point: loads configuration, initializes logging, and runs the
//! HTTP server.

use tracing_subscriber::{EnvFilter, fmt};

use etmf_core::config::{AppConfig, LogFormat};

#[tokio::main]
async fn main() {
    let env = std::env::var("ETMF_ENV").unwrap_or_else(|_| "development".to_string());
    let config_dir = std::env::var("ETMF_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    let config = match AppConfig::load_from_dir(&config_dir, &env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        env = %env,
        config_dir = %config_dir,
        "eTMF portal starting"
    );

    if let Err(e) = etmf_api::run_server(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Installs the global subscriber described by `[logging]`. `RUST_LOG`
/// overrides the configured level.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = fmt().with_env_filter(filter).with_target(true);

    match config.logging.format {
        LogFormat::Json => builder.json().with_current_span(false).init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}
