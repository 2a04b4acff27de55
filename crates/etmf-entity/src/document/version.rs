//! Document version entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::error::BoxDynError;
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, FromRow};
use uuid::Uuid;
use validator::Validate;

use crate::table::{Table, TableRow};

/// One stored revision of a document's content.
///
/// Rows are only ever created by an upload; `file_path` is the object
/// storage key the bytes were written to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate)]
pub struct DocumentVersion {
    /// Unique version identifier; also the object file stem.
    pub id: Uuid,
    /// The document this version belongs to.
    pub document_id: Uuid,
    /// Version number, starting at 1 and contiguous per document.
    #[validate(range(min = 1))]
    pub document_version: i32,
    /// Display name of the document at this version.
    #[validate(length(min = 1, max = 512))]
    pub document_name: String,
    /// Original uploaded file name.
    #[validate(length(min = 1, max = 512))]
    pub file_name: String,
    /// Object storage key.
    pub file_path: String,
    /// MIME type reported by the client.
    pub file_type: Option<String>,
    /// Size in bytes.
    pub file_size: i64,
    /// SHA-256 of the content, hex encoded.
    #[validate(length(equal = 64))]
    pub checksum: String,
    /// Uploader.
    pub uploaded_by: Uuid,
    /// Upload time.
    pub uploaded_at: DateTime<Utc>,
    /// Free-text reason for the revision.
    pub change_reason: Option<String>,
}

impl TableRow for DocumentVersion {
    const TABLE: Table = Table::DocumentVersions;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "document_id",
        "document_version",
        "document_name",
        "file_name",
        "file_path",
        "file_type",
        "file_size",
        "checksum",
        "uploaded_by",
        "uploaded_at",
        "change_reason",
    ];
    const ORDER_BY: &'static str = "document_id ASC, document_version ASC";

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn bind_columns(&self, args: &mut PgArguments) -> Result<(), BoxDynError> {
        args.add(self.id)?;
        args.add(self.document_id)?;
        args.add(self.document_version)?;
        args.add(self.document_name.clone())?;
        args.add(self.file_name.clone())?;
        args.add(self.file_path.clone())?;
        args.add(self.file_type.clone())?;
        args.add(self.file_size)?;
        args.add(self.checksum.clone())?;
        args.add(self.uploaded_by)?;
        args.add(self.uploaded_at)?;
        args.add(self.change_reason.clone())?;
        Ok(())
    }
}
