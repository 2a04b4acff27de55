//! PostgreSQL backend of the table store.
//!
//! Statements are assembled from [`TableRow::COLUMNS`] and the table name,
//! both compile-time constants; values always travel as bind parameters.

use sqlx::postgres::PgArguments;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use etmf_core::error::{AppError, ErrorKind};
use etmf_core::result::AppResult;
use etmf_entity::{Table, TableRow};

use super::FilterValue;

/// Table store over a sqlx PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgTableStore {
    pool: PgPool,
}

impl PgTableStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub(super) async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }

    pub(super) async fn list<R: TableRow>(&self) -> AppResult<Vec<R>> {
        let sql = format!("SELECT * FROM {} ORDER BY {}", R::TABLE.name(), R::ORDER_BY);
        sqlx::query_as::<_, R>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "list", R::TABLE))
    }

    pub(super) async fn list_by<R: TableRow>(
        &self,
        column: &str,
        value: &FilterValue,
    ) -> AppResult<Vec<R>> {
        let sql = select_by_sql(R::TABLE.name(), column, value, R::ORDER_BY);
        let query = sqlx::query_as::<_, R>(&sql);
        let query = match value {
            FilterValue::Uuid(u) => query.bind(*u),
            FilterValue::Text(s) => query.bind(s.clone()),
        };
        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "query", R::TABLE))
    }

    pub(super) async fn find<R: TableRow>(&self, id: Uuid) -> AppResult<Option<R>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = $1",
            R::TABLE.name(),
            R::COLUMNS[0]
        );
        sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "find row in", R::TABLE))
    }

    pub(super) async fn count<R: TableRow>(&self) -> AppResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", R::TABLE.name());
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "count", R::TABLE))
    }

    pub(super) async fn insert<R: TableRow>(&self, row: &R) -> AppResult<R> {
        let sql = insert_sql(R::TABLE.name(), R::COLUMNS);
        let args = bind_row(row)?;
        let stored = sqlx::query_as_with::<_, R, _>(&sql, args)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "insert into", R::TABLE))?;
        debug!(table = %R::TABLE, id = %stored.id(), "Inserted row");
        Ok(stored)
    }

    pub(super) async fn update<R: TableRow>(&self, row: &R) -> AppResult<Option<R>> {
        let sql = update_sql(R::TABLE.name(), R::COLUMNS);
        let args = bind_row(row)?;
        let stored = sqlx::query_as_with::<_, R, _>(&sql, args)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "update", R::TABLE))?;
        debug!(table = %R::TABLE, id = %row.id(), found = stored.is_some(), "Updated row");
        Ok(stored)
    }

    pub(super) async fn delete<R: TableRow>(&self, id: Uuid) -> AppResult<bool> {
        let sql = format!("DELETE FROM {} WHERE {} = $1", R::TABLE.name(), R::COLUMNS[0]);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "delete from", R::TABLE))?;
        Ok(result.rows_affected() > 0)
    }
}

fn bind_row<R: TableRow>(row: &R) -> AppResult<PgArguments> {
    let mut args = PgArguments::default();
    row.bind_columns(&mut args).map_err(|e| {
        AppError::internal(format!("Failed to bind '{}' row: {e}", R::TABLE))
    })?;
    Ok(args)
}

/// Translate constraint violations into client errors; everything else is a
/// store failure.
fn map_sqlx_error(e: sqlx::Error, action: &str, table: Table) -> AppError {
    let code = e
        .as_database_error()
        .and_then(|d| d.code())
        .map(|c| c.into_owned());

    match code.as_deref() {
        Some("23505") => AppError::with_source(
            ErrorKind::Conflict,
            format!("Duplicate value in '{table}'"),
            e,
        ),
        Some("23503") => AppError::with_source(
            ErrorKind::Validation,
            format!("Row in '{table}' references a missing record"),
            e,
        ),
        Some("23502") | Some("23514") | Some("22P02") => AppError::with_source(
            ErrorKind::Validation,
            format!("Row rejected by '{table}' constraints"),
            e,
        ),
        _ => AppError::with_source(
            ErrorKind::Database,
            format!("Failed to {action} '{table}'"),
            e,
        ),
    }
}

fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {table} ({}) VALUES ({}) RETURNING *",
        columns.join(", "),
        placeholders.join(", ")
    )
}

fn update_sql(table: &str, columns: &[&str]) -> String {
    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, c)| format!("{c} = ${}", i + 1))
        .collect();
    format!(
        "UPDATE {table} SET {} WHERE {} = $1 RETURNING *",
        assignments.join(", "),
        columns[0]
    )
}

/// Enum columns compare against text parameters only after a cast.
fn select_by_sql(table: &str, column: &str, value: &FilterValue, order_by: &str) -> String {
    let lhs = match value {
        FilterValue::Uuid(_) => column.to_string(),
        FilterValue::Text(_) => format!("{column}::text"),
    };
    format!("SELECT * FROM {table} WHERE {lhs} = $1 ORDER BY {order_by}")
}
