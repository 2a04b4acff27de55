//! Schema migration commands.

use anyhow::Context;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use etmf_core::config::AppConfig;
use etmf_database::DatabasePool;
use etmf_database::migration::{migration_status, run_migrations};

use crate::output::{self, OutputFormat};

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Apply all pending migrations
    Run,
    /// Show which embedded migrations the database has applied
    Status,
}

#[derive(Serialize, Tabled)]
struct MigrationRow {
    version: i64,
    description: String,
    applied: bool,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig, format: OutputFormat) -> anyhow::Result<()> {
    let db = DatabasePool::connect(&config.database)
        .await
        .context("Cannot reach the database")?;

    match &args.command {
        MigrateCommand::Run => {
            let ran = run_migrations(db.pool()).await.context("Migration failed")?;
            if ran == 0 {
                output::print_success("Schema already up to date.");
            } else {
                output::print_success(&format!("Applied {ran} migration(s)."));
            }
        }
        MigrateCommand::Status => {
            let rows: Vec<MigrationRow> = migration_status(db.pool())
                .await?
                .into_iter()
                .map(|s| MigrationRow {
                    version: s.version,
                    description: s.description,
                    applied: s.applied,
                })
                .collect();
            output::print_list(&rows, format)?;
        }
    }
    Ok(())
}
