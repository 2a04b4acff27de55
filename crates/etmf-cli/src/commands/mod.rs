//! CLI command definitions and dispatch.

pub mod key;
pub mod migrate;
pub mod serve;
pub mod session;
pub mod user;

use anyhow::Context;
use clap::{Parser, Subcommand};

use etmf_core::config::AppConfig;
use etmf_database::TableStore;

use crate::output::OutputFormat;

/// eTMF portal: electronic Trial Master File
#[derive(Debug, Parser)]
#[command(name = "etmf", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and the environment overlays
    #[arg(short, long, default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to apply
    #[arg(short, long, env = "ETMF_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the portal server
    Serve,
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// User management
    User(user::UserArgs),
    /// Session maintenance
    Session(session::SessionArgs),
    /// Build or inspect document version storage keys
    Key(key::KeyArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> anyhow::Result<()> {
        match &self.command {
            Commands::Serve => serve::execute(self.load_config()?).await,
            Commands::Migrate(args) => {
                migrate::execute(args, &self.load_config()?, self.format).await
            }
            Commands::User(args) => user::execute(args, &self.load_config()?, self.format).await,
            Commands::Session(args) => session::execute(args, &self.load_config()?).await,
            Commands::Key(args) => key::execute(args, self.format),
        }
    }

    fn load_config(&self) -> anyhow::Result<AppConfig> {
        AppConfig::load_from_dir(&self.config_dir, &self.env)
            .with_context(|| format!("Failed to load configuration from '{}'", self.config_dir))
    }
}

/// Helper: open the configured table store
pub async fn open_store(config: &AppConfig) -> anyhow::Result<TableStore> {
    TableStore::from_config(&config.database)
        .await
        .context("Failed to open the table store")
}
