//! `serve`: run the HTTP server in the foreground.

use anyhow::Context;

use etmf_core::config::AppConfig;

/// Execute the serve command
pub async fn execute(config: AppConfig) -> anyhow::Result<()> {
    etmf_api::run_server(config)
        .await
        .context("Server terminated with an error")
}
