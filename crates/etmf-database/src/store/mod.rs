//! Table store: generic reads and writes over every known table.
//!
//! The store is an enum over its backends rather than a trait object so
//! that its operations can stay generic over the row type.

pub mod memory;
pub mod postgres;

use std::fmt;

use tracing::info;
use uuid::Uuid;

use etmf_core::config::{DatabaseConfig, DatabaseProvider};
use etmf_core::error::AppError;
use etmf_core::result::AppResult;
use etmf_entity::TableRow;

use crate::connection::DatabasePool;
use crate::migration::run_migrations;

pub use self::memory::MemoryTableStore;
pub use self::postgres::PgTableStore;

/// A value a column is compared against in [`TableStore::list_by`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// A UUID column (primary or foreign key).
    Uuid(Uuid),
    /// A text or enum column, compared by its text representation.
    Text(String),
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// The relational store, backed by PostgreSQL or by process memory.
#[derive(Debug, Clone)]
pub enum TableStore {
    /// PostgreSQL via sqlx.
    Postgres(PgTableStore),
    /// In-process tables.
    Memory(MemoryTableStore),
}

/// Ensure `column` belongs to `R` before it is interpolated into SQL or
/// looked up in a serialized row.
pub(crate) fn check_column<R: TableRow>(column: &str) -> AppResult<()> {
    if R::COLUMNS.contains(&column) {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Unknown column '{column}' for table '{}'",
            R::TABLE
        )))
    }
}

impl TableStore {
    /// Build the store selected by `config.provider`.
    ///
    /// The PostgreSQL backend connects and, unless disabled, runs pending
    /// migrations.
    pub async fn from_config(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider {
            DatabaseProvider::Postgres => {
                let db = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(db.pool()).await?;
                }
                Ok(Self::Postgres(PgTableStore::new(db.into_pool())))
            }
            DatabaseProvider::Memory => {
                info!("Using in-memory table store; data is not persisted");
                Ok(Self::Memory(MemoryTableStore::new()))
            }
        }
    }

    /// Create an empty in-memory store.
    pub fn memory() -> Self {
        Self::Memory(MemoryTableStore::new())
    }

    /// Backend name, for logs and health output.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }

    /// Check that the backend is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        match self {
            Self::Postgres(s) => s.health_check().await,
            Self::Memory(s) => s.health_check(),
        }
    }

    /// All rows of `R`'s table, in the table's natural order.
    pub async fn list<R: TableRow>(&self) -> AppResult<Vec<R>> {
        match self {
            Self::Postgres(s) => s.list::<R>().await,
            Self::Memory(s) => s.list::<R>(),
        }
    }

    /// Rows whose `column` equals `value`, in the table's natural order.
    pub async fn list_by<R: TableRow>(
        &self,
        column: &str,
        value: impl Into<FilterValue>,
    ) -> AppResult<Vec<R>> {
        check_column::<R>(column)?;
        let value = value.into();
        match self {
            Self::Postgres(s) => s.list_by::<R>(column, &value).await,
            Self::Memory(s) => s.list_by::<R>(column, &value),
        }
    }

    /// First row whose `column` equals `value`.
    pub async fn find_first_by<R: TableRow>(
        &self,
        column: &str,
        value: impl Into<FilterValue>,
    ) -> AppResult<Option<R>> {
        Ok(self.list_by::<R>(column, value).await?.into_iter().next())
    }

    /// The row with primary key `id`.
    pub async fn find<R: TableRow>(&self, id: Uuid) -> AppResult<Option<R>> {
        match self {
            Self::Postgres(s) => s.find::<R>(id).await,
            Self::Memory(s) => s.find::<R>(id),
        }
    }

    /// Number of rows in `R`'s table.
    pub async fn count<R: TableRow>(&self) -> AppResult<i64> {
        match self {
            Self::Postgres(s) => s.count::<R>().await,
            Self::Memory(s) => s.count::<R>(),
        }
    }

    /// Insert `row` and return it as stored.
    pub async fn insert<R: TableRow>(&self, row: &R) -> AppResult<R> {
        match self {
            Self::Postgres(s) => s.insert(row).await,
            Self::Memory(s) => s.insert(row),
        }
    }

    /// Replace the row whose primary key equals `row.id()`.
    ///
    /// Returns `None` when no such row exists.
    pub async fn update<R: TableRow>(&self, row: &R) -> AppResult<Option<R>> {
        match self {
            Self::Postgres(s) => s.update(row).await,
            Self::Memory(s) => s.update(row),
        }
    }

    /// Delete the row with primary key `id`. Returns whether a row was removed.
    pub async fn delete<R: TableRow>(&self, id: Uuid) -> AppResult<bool> {
        match self {
            Self::Postgres(s) => s.delete::<R>(id).await,
            Self::Memory(s) => s.delete::<R>(id),
        }
    }
}
