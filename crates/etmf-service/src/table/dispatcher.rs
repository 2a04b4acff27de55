//! Table-agnostic read, upsert, and delete.
//!
//! Every operation is generic over a [`TableRow`]; the row type fixes the
//! table, and the table fixes which operations are allowed and which role
//! they require. Nothing is cached: each call goes to the store.

use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use etmf_core::error::AppError;
use etmf_core::result::AppResult;
use etmf_database::TableStore;
use etmf_entity::{TableOperation, TableRow};

use crate::context::RequestContext;

/// Outcome of [`TableDispatcher::create_or_update`].
#[derive(Debug, Clone, PartialEq)]
pub enum Upserted<R> {
    /// No row had the body's primary key; a new row was inserted.
    Inserted(R),
    /// The row with the body's primary key was replaced.
    Updated(R),
}

impl<R> Upserted<R> {
    /// Whether a new row was created.
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }

    /// The persisted row.
    pub fn row(&self) -> &R {
        match self {
            Self::Inserted(r) | Self::Updated(r) => r,
        }
    }

    /// Consume into the persisted row.
    pub fn into_inner(self) -> R {
        match self {
            Self::Inserted(r) | Self::Updated(r) => r,
        }
    }
}

/// Dispatches CRUD requests to the table store.
#[derive(Debug, Clone)]
pub struct TableDispatcher {
    store: TableStore,
}

impl TableDispatcher {
    /// Creates a dispatcher over `store`.
    pub fn new(store: TableStore) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &TableStore {
        &self.store
    }

    /// Checks that `op` is allowed on `R`'s table and that the caller's
    /// role is sufficient.
    pub fn authorize<R: TableRow>(ctx: &RequestContext, op: TableOperation) -> AppResult<()> {
        let table = R::TABLE;
        if !table.is_exposed() || !table.allows(op) {
            return Err(AppError::unsupported(format!(
                "Operation '{op}' is not supported on table '{table}'"
            )));
        }
        ctx.require_role(table.required_role(op))
    }

    /// Parses a JSON body into a row and validates it.
    pub fn parse_body<R: TableRow>(body: &[u8]) -> AppResult<R> {
        let row: R = serde_json::from_slice(body)
            .map_err(|e| AppError::validation(format!("Malformed request body: {e}")))?;
        row.validate()
            .map_err(|e| AppError::validation(format!("Validation failed: {e}")))?;
        Ok(row)
    }

    /// Returns every row of `R`'s table in its natural order.
    pub async fn get_table<R: TableRow>(&self, ctx: &RequestContext) -> AppResult<Vec<R>> {
        Self::authorize::<R>(ctx, TableOperation::Read)?;
        let rows = self.store.list::<R>().await?;
        debug!(table = %R::TABLE, rows = rows.len(), "Listed table");
        Ok(rows)
    }

    /// Parses `body` into a row and upserts it by primary key.
    pub async fn create_or_update<R: TableRow>(
        &self,
        ctx: &RequestContext,
        body: &[u8],
    ) -> AppResult<Upserted<R>> {
        Self::authorize::<R>(ctx, TableOperation::Write)?;
        let row = Self::parse_body::<R>(body)?;
        self.upsert(ctx, row).await
    }

    /// Upserts an already parsed row.
    ///
    /// Used by routes that adjust the row between parsing and saving.
    pub async fn save<R: TableRow>(&self, ctx: &RequestContext, row: R) -> AppResult<Upserted<R>> {
        Self::authorize::<R>(ctx, TableOperation::Write)?;
        row.validate()
            .map_err(|e| AppError::validation(format!("Validation failed: {e}")))?;
        self.upsert(ctx, row).await
    }

    async fn upsert<R: TableRow>(&self, ctx: &RequestContext, mut row: R) -> AppResult<Upserted<R>> {
        let table = R::TABLE;

        if !row.id().is_nil() {
            if let Some(existing) = self.store.find::<R>(row.id()).await? {
                row.preserve_from(&existing);
                let updated = self
                    .store
                    .update(&row)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Record not found in '{table}'")))?;
                info!(table = %table, id = %updated.id(), user_id = %ctx.user_id, "Record updated");
                return Ok(Upserted::Updated(updated));
            }
        } else {
            row.set_id(Uuid::new_v4());
        }

        let inserted = self.store.insert(&row).await?;
        info!(table = %table, id = %inserted.id(), user_id = %ctx.user_id, "Record created");
        Ok(Upserted::Inserted(inserted))
    }

    /// Fetches one row; absent → `NotFound`.
    pub async fn get_record<R: TableRow>(&self, ctx: &RequestContext, id: Uuid) -> AppResult<R> {
        Self::authorize::<R>(ctx, TableOperation::Read)?;
        self.store
            .find::<R>(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Record {id} not found in '{}'", R::TABLE)))
    }

    /// Removes the row with primary key `id`; absent → `NotFound`.
    pub async fn delete_record<R: TableRow>(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        Self::authorize::<R>(ctx, TableOperation::Delete)?;
        if !self.store.delete::<R>(id).await? {
            return Err(AppError::not_found(format!(
                "Record {id} not found in '{}'",
                R::TABLE
            )));
        }
        info!(table = %R::TABLE, id = %id, user_id = %ctx.user_id, "Record deleted");
        Ok(())
    }
}

/// Extracts the record identifier from the `id` query parameter or, failing
/// that, from a JSON body `{ "id": ... }`.
pub fn parse_record_id(query_id: Option<&str>, body: &[u8]) -> AppResult<Uuid> {
    let raw = match query_id {
        Some(id) if !id.trim().is_empty() => id.trim().to_string(),
        _ => {
            if body.iter().all(u8::is_ascii_whitespace) {
                return Err(AppError::validation("Missing record id"));
            }
            let value: serde_json::Value = serde_json::from_slice(body)
                .map_err(|e| AppError::validation(format!("Malformed request body: {e}")))?;
            value
                .get("id")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| AppError::validation("Missing record id"))?
        }
    };

    Uuid::parse_str(&raw).map_err(|_| AppError::validation(format!("Invalid record id: '{raw}'")))
}
