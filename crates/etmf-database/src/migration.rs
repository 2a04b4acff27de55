//! Embedded schema migrations and their applied state.

use std::collections::HashSet;

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use etmf_core::error::{AppError, ErrorKind};
use etmf_core::result::AppResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// One embedded migration and whether the database has applied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Timestamp version from the file name.
    pub version: i64,
    /// Description from the file name.
    pub description: String,
    /// Whether the migration ran successfully.
    pub applied: bool,
}

fn migration_error(action: &str, e: impl std::error::Error + Send + Sync + 'static) -> AppError {
    AppError::with_source(ErrorKind::Database, format!("{action}: {e}"), e)
}

/// Versions recorded as successfully applied. Empty on a fresh database.
async fn applied_versions(pool: &PgPool) -> AppResult<HashSet<i64>> {
    let tracked: bool =
        sqlx::query_scalar("SELECT to_regclass('public._sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await
            .map_err(|e| migration_error("Failed to inspect migrations", e))?;
    if !tracked {
        return Ok(HashSet::new());
    }

    let versions: Vec<i64> =
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success")
            .fetch_all(pool)
            .await
            .map_err(|e| migration_error("Failed to read applied migrations", e))?;
    Ok(versions.into_iter().collect())
}

/// Applies every pending migration and returns how many ran.
pub async fn run_migrations(pool: &PgPool) -> AppResult<usize> {
    let before = applied_versions(pool).await?;
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| migration_error("Failed to run migrations", e))?;

    let ran = MIGRATOR
        .iter()
        .filter(|m| !before.contains(&m.version))
        .count();
    info!(applied = ran, total = MIGRATOR.iter().count(), "Schema is up to date");
    Ok(ran)
}

/// Lists the embedded migrations in version order with their state.
pub async fn migration_status(pool: &PgPool) -> AppResult<Vec<MigrationStatus>> {
    let applied = applied_versions(pool).await?;
    Ok(embedded(&applied))
}

fn embedded(applied: &HashSet<i64>) -> Vec<MigrationStatus> {
    let mut statuses: Vec<MigrationStatus> = MIGRATOR
        .iter()
        .map(|m| MigrationStatus {
            version: m.version,
            description: m.description.to_string(),
            applied: applied.contains(&m.version),
        })
        .collect();
    statuses.sort_by_key(|s| s.version);
    statuses
}
