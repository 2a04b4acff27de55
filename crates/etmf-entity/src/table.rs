//! Registry of the known tables and the trait binding each to a typed row.
//!
//! Table names are never looked up at runtime against a schema: every table
//! is a [`Table`] variant with a fixed SQL name and a fixed set of allowed
//! operations, and every row type names its table through
//! [`TableRow::TABLE`].

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArguments, PgRow};
use uuid::Uuid;
use validator::Validate;

use etmf_core::error::AppError;

use crate::user::UserRole;

/// An operation the dispatcher can perform against a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableOperation {
    /// List rows.
    Read,
    /// Insert or update a row.
    Write,
    /// Remove a row.
    Delete,
}

impl fmt::Display for TableOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Every table the portal knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// Clinical studies.
    Studies,
    /// Investigator sites.
    Sites,
    /// Portal users.
    Users,
    /// TMF folder structure.
    Folders,
    /// Documents (metadata only; content lives in object storage).
    Documents,
    /// Stored revisions of documents.
    DocumentVersions,
    /// Login sessions. Internal, never reachable through the dispatcher.
    Sessions,
}

impl Table {
    /// Tables reachable through the generic CRUD routes.
    pub const EXPOSED: [Table; 6] = [
        Table::Studies,
        Table::Sites,
        Table::Users,
        Table::Folders,
        Table::Documents,
        Table::DocumentVersions,
    ];

    /// SQL table name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Studies => "studies",
            Self::Sites => "sites",
            Self::Users => "users",
            Self::Folders => "folders",
            Self::Documents => "documents",
            Self::DocumentVersions => "document_versions",
            Self::Sessions => "sessions",
        }
    }

    /// Whether the table can be addressed by the generic routes.
    pub fn is_exposed(&self) -> bool {
        !matches!(self, Self::Sessions)
    }

    /// Whether the dispatcher may perform `op` on this table.
    ///
    /// Documents are soft-deleted through their own route, and versions are
    /// only ever created by an upload.
    pub fn allows(&self, op: TableOperation) -> bool {
        match self {
            Self::Studies | Self::Sites | Self::Users | Self::Folders => true,
            Self::Documents => matches!(op, TableOperation::Read | TableOperation::Write),
            Self::DocumentVersions => matches!(op, TableOperation::Read),
            Self::Sessions => false,
        }
    }

    /// Minimum role required to perform `op` on this table.
    pub fn required_role(&self, op: TableOperation) -> UserRole {
        match (self, op) {
            (_, TableOperation::Read) => UserRole::Viewer,
            (Self::Users, _) => UserRole::Admin,
            _ => UserRole::Contributor,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = AppError;

    /// Resolve a table name from a request path. Only exposed tables resolve.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "studies" | "study" => Ok(Self::Studies),
            "sites" | "site" => Ok(Self::Sites),
            "users" | "user" => Ok(Self::Users),
            "folders" | "folder" => Ok(Self::Folders),
            "documents" | "document" => Ok(Self::Documents),
            "document_versions" | "document-versions" => Ok(Self::DocumentVersions),
            _ => Err(AppError::validation(format!("Unknown table: '{s}'"))),
        }
    }
}

/// A typed row of one of the known tables.
///
/// Implementations list their columns in bind order, with the primary key
/// first, so that a store can build `INSERT` and `UPDATE` statements for any
/// row type without table-specific SQL.
pub trait TableRow:
    Serialize
    + DeserializeOwned
    + for<'r> sqlx::FromRow<'r, PgRow>
    + Validate
    + Clone
    + Send
    + Sync
    + Unpin
    + fmt::Debug
    + 'static
{
    /// The table this row belongs to.
    const TABLE: Table;

    /// Column names in bind order. `COLUMNS[0]` is the primary key.
    const COLUMNS: &'static [&'static str];

    /// `ORDER BY` clause used when listing the table.
    const ORDER_BY: &'static str = "created_at ASC, id ASC";

    /// Columns whose values must be unique across the table, besides the
    /// primary key.
    const UNIQUE: &'static [&'static str] = &[];

    /// Primary key value.
    fn id(&self) -> Uuid;

    /// Replace the primary key value.
    fn set_id(&mut self, id: Uuid);

    /// Append every column value to `args`, in [`Self::COLUMNS`] order.
    fn bind_columns(&self, args: &mut PgArguments) -> Result<(), BoxDynError>;

    /// Carry over fields an update must not change, such as creation
    /// metadata, from the currently stored row.
    fn preserve_from(&mut self, _existing: &Self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_route_aliases() {
        assert_eq!("site".parse::<Table>().unwrap(), Table::Sites);
        assert_eq!("sites".parse::<Table>().unwrap(), Table::Sites);
        assert_eq!(
            "document-versions".parse::<Table>().unwrap(),
            Table::DocumentVersions
        );
    }

    #[test]
    fn test_sessions_are_not_addressable() {
        assert!("sessions".parse::<Table>().is_err());
        assert!(!Table::Sessions.is_exposed());
        assert!(!Table::EXPOSED.contains(&Table::Sessions));
    }

    #[test]
    fn test_unknown_table_is_validation_error() {
        let err = "patients".parse::<Table>().unwrap_err();
        assert_eq!(err.kind, etmf_core::error::ErrorKind::Validation);
    }

    #[test]
    fn test_allowed_operations() {
        assert!(Table::Sites.allows(TableOperation::Delete));
        assert!(Table::Documents.allows(TableOperation::Write));
        assert!(!Table::Documents.allows(TableOperation::Delete));
        assert!(Table::DocumentVersions.allows(TableOperation::Read));
        assert!(!Table::DocumentVersions.allows(TableOperation::Write));
    }

    #[test]
    fn test_required_roles() {
        assert_eq!(
            Table::Users.required_role(TableOperation::Write),
            UserRole::Admin
        );
        assert_eq!(
            Table::Sites.required_role(TableOperation::Delete),
            UserRole::Contributor
        );
        assert_eq!(
            Table::Users.required_role(TableOperation::Read),
            UserRole::Viewer
        );
    }
}
