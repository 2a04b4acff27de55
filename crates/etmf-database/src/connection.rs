//! PostgreSQL pool setup.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use etmf_core::config::DatabaseConfig;
use etmf_core::error::{AppError, ErrorKind};
use etmf_core::result::AppResult;

/// Name reported in `pg_stat_activity`.
const APPLICATION_NAME: &str = "etmf-portal";

/// Connection pool for the PostgreSQL table store.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

/// Parses `database.url`. A missing or malformed URL is a configuration
/// error, reported before any connection attempt.
fn connect_options(config: &DatabaseConfig) -> AppResult<PgConnectOptions> {
    if config.url.trim().is_empty() {
        return Err(AppError::configuration(
            "database.url is required for the postgres provider",
        ));
    }
    PgConnectOptions::from_str(&config.url)
        .map(|options| options.application_name(APPLICATION_NAME))
        .map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "database.url is not a valid PostgreSQL URL", e)
        })
}

impl DatabasePool {
    /// Opens a pool sized by `config`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = connect_options(config)?;

        info!(
            host = options.get_host(),
            port = options.get_port(),
            database = options.get_database().unwrap_or("<default>"),
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections.min(config.max_connections))
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, format!("Failed to connect to database: {e}"), e)
            })?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn into_pool(self) -> PgPool {
        self.pool
    }
}
