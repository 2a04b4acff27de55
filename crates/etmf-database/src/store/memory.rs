//! In-process backend of the table store.
//!
//! Rows are kept as typed values so that fields hidden from serialization
//! (such as password hashes) survive a round trip. Filtering, ordering, and
//! uniqueness checks look at the serialized form of each row.

use std::any::Any;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use etmf_core::error::AppError;
use etmf_core::result::AppResult;
use etmf_entity::{Table, TableRow};

use super::FilterValue;

type StoredRow = Arc<dyn Any + Send + Sync>;

/// Table store held entirely in memory. Cloning shares the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: DashMap<Table, Vec<StoredRow>>,
    offline: AtomicBool,
}

impl MemoryTableStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail as if the database were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, AtomicOrdering::SeqCst);
    }

    fn ensure_online(&self) -> AppResult<()> {
        if self.inner.offline.load(AtomicOrdering::SeqCst) {
            Err(AppError::database("In-memory store is offline"))
        } else {
            Ok(())
        }
    }

    pub(super) fn health_check(&self) -> AppResult<bool> {
        Ok(!self.inner.offline.load(AtomicOrdering::SeqCst))
    }

    fn rows<R: TableRow>(&self) -> Vec<R> {
        self.inner
            .tables
            .get(&R::TABLE)
            .map(|rows| {
                rows.iter()
                    .filter_map(|r| r.downcast_ref::<R>().cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(super) fn list<R: TableRow>(&self) -> AppResult<Vec<R>> {
        self.ensure_online()?;
        let mut rows = self.rows::<R>();
        sort_rows(&mut rows, R::ORDER_BY)?;
        Ok(rows)
    }

    pub(super) fn list_by<R: TableRow>(
        &self,
        column: &str,
        value: &FilterValue,
    ) -> AppResult<Vec<R>> {
        let expected = Value::String(value.to_string());
        let mut matched = Vec::new();
        for row in self.list::<R>()? {
            if serde_json::to_value(&row)?.get(column) == Some(&expected) {
                matched.push(row);
            }
        }
        Ok(matched)
    }

    pub(super) fn find<R: TableRow>(&self, id: Uuid) -> AppResult<Option<R>> {
        self.ensure_online()?;
        Ok(self.rows::<R>().into_iter().find(|r| r.id() == id))
    }

    pub(super) fn count<R: TableRow>(&self) -> AppResult<i64> {
        self.ensure_online()?;
        Ok(self
            .inner
            .tables
            .get(&R::TABLE)
            .map(|rows| rows.len() as i64)
            .unwrap_or(0))
    }

    pub(super) fn insert<R: TableRow>(&self, row: &R) -> AppResult<R> {
        self.ensure_online()?;
        let mut rows = self.inner.tables.entry(R::TABLE).or_default();

        if rows
            .iter()
            .filter_map(|r| r.downcast_ref::<R>())
            .any(|r| r.id() == row.id())
        {
            return Err(AppError::conflict(format!(
                "Duplicate value in '{}'",
                R::TABLE
            )));
        }
        check_unique(rows.as_slice(), row)?;

        rows.push(Arc::new(row.clone()));
        Ok(row.clone())
    }

    pub(super) fn update<R: TableRow>(&self, row: &R) -> AppResult<Option<R>> {
        self.ensure_online()?;
        let mut rows = self.inner.tables.entry(R::TABLE).or_default();

        let Some(index) = rows
            .iter()
            .position(|r| r.downcast_ref::<R>().is_some_and(|r| r.id() == row.id()))
        else {
            return Ok(None);
        };
        check_unique(rows.as_slice(), row)?;

        rows[index] = Arc::new(row.clone());
        Ok(Some(row.clone()))
    }

    pub(super) fn delete<R: TableRow>(&self, id: Uuid) -> AppResult<bool> {
        self.ensure_online()?;
        let Some(mut rows) = self.inner.tables.get_mut(&R::TABLE) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|r| r.downcast_ref::<R>().is_none_or(|r| r.id() != id));
        Ok(rows.len() < before)
    }
}

/// Reject `row` if another row already holds one of its unique values.
fn check_unique<R: TableRow>(rows: &[StoredRow], row: &R) -> AppResult<()> {
    if R::UNIQUE.is_empty() {
        return Ok(());
    }
    let candidate = serde_json::to_value(row)?;
    for other in rows.iter().filter_map(|r| r.downcast_ref::<R>()) {
        if other.id() == row.id() {
            continue;
        }
        let other = serde_json::to_value(other)?;
        for column in R::UNIQUE {
            if candidate.get(*column).is_some() && candidate.get(*column) == other.get(*column) {
                return Err(AppError::conflict(format!(
                    "Duplicate value for '{column}' in '{}'",
                    R::TABLE
                )));
            }
        }
    }
    Ok(())
}

/// Stable sort by an `ORDER BY` clause such as `"document_id ASC, document_version ASC"`.
fn sort_rows<R: TableRow>(rows: &mut [R], order_by: &str) -> AppResult<()> {
    let keys: Vec<(&str, bool)> = order_by
        .split(',')
        .filter_map(|part| {
            let mut words = part.split_whitespace();
            let column = words.next()?;
            let descending = words.next().is_some_and(|w| w.eq_ignore_ascii_case("desc"));
            Some((column, descending))
        })
        .collect();

    let mut keyed = Vec::with_capacity(rows.len());
    for row in rows.iter() {
        keyed.push(serde_json::to_value(row)?);
    }
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        for (column, descending) in &keys {
            let ordering = compare_values(keyed[a].get(*column), keyed[b].get(*column));
            let ordering = if *descending { ordering.reverse() } else { ordering };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });

    let sorted: Vec<R> = order.into_iter().map(|i| rows[i].clone()).collect();
    for (slot, row) in rows.iter_mut().zip(sorted) {
        *slot = row;
    }
    Ok(())
}

/// Order JSON scalars the way PostgreSQL orders the underlying columns,
/// with NULLs last. Timestamps are compared as instants, not strings.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (
                chrono::DateTime::parse_from_rfc3339(x),
                chrono::DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        _ => Ordering::Equal,
    }
}
