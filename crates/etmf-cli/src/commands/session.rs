//! Session maintenance commands.

use std::sync::Arc;

use clap::{Args, Subcommand};

use etmf_auth::{PasswordHasher, SessionManager};
use etmf_core::config::AppConfig;

use crate::output;

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Delete expired and logged-out sessions
    Purge,
}

/// Execute session commands
pub async fn execute(args: &SessionArgs, config: &AppConfig) -> anyhow::Result<()> {
    let store = super::open_store(config).await?;
    let manager = SessionManager::new(
        store,
        Arc::new(PasswordHasher::new()),
        &config.auth,
        config.session.clone(),
    );

    match &args.command {
        SessionCommand::Purge => {
            let removed = manager.purge_expired().await?;
            output::print_success(&format!("Removed {} session(s)", removed.len()));
        }
    }
    Ok(())
}
