//! Document entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::error::BoxDynError;
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, FromRow};
use uuid::Uuid;
use validator::Validate;

use super::status::DocumentStatus;
use crate::table::{Table, TableRow};

/// A TMF document. Holds metadata only; content lives in its versions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate)]
pub struct Document {
    /// Unique document identifier. Nil or absent on create.
    #[serde(default)]
    pub id: Uuid,
    /// Owning study.
    pub study_id: Uuid,
    /// Site the document is filed under, if site-level.
    #[serde(default)]
    pub site_id: Option<Uuid>,
    /// Folder the document is filed in.
    pub folder_id: Uuid,
    /// TMF reference model zone.
    #[serde(default)]
    #[validate(length(max = 128))]
    pub zone: Option<String>,
    /// TMF reference model artifact.
    #[serde(default)]
    #[validate(length(max = 128))]
    pub artifact: Option<String>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: DocumentStatus,
    /// Latest uploaded version, if any.
    #[serde(default)]
    pub current_version_id: Option<Uuid>,
    /// User who created the document. Filled from the session on insert.
    #[serde(default)]
    pub created_by: Uuid,
    /// When the document was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Soft-delete flag.
    #[serde(default)]
    pub is_deleted: bool,
}

impl Document {
    /// Whether the document is visible in listings.
    pub fn is_visible(&self) -> bool {
        !self.is_deleted
    }
}

impl TableRow for Document {
    const TABLE: Table = Table::Documents;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "study_id",
        "site_id",
        "folder_id",
        "zone",
        "artifact",
        "status",
        "current_version_id",
        "created_by",
        "created_at",
        "is_deleted",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn bind_columns(&self, args: &mut PgArguments) -> Result<(), BoxDynError> {
        args.add(self.id)?;
        args.add(self.study_id)?;
        args.add(self.site_id)?;
        args.add(self.folder_id)?;
        args.add(self.zone.clone())?;
        args.add(self.artifact.clone())?;
        args.add(self.status)?;
        args.add(self.current_version_id)?;
        args.add(self.created_by)?;
        args.add(self.created_at)?;
        args.add(self.is_deleted)?;
        Ok(())
    }

    /// Metadata updates never clear the current version and never change
    /// the deletion state; both move only through the document routes.
    fn preserve_from(&mut self, existing: &Self) {
        self.created_by = existing.created_by;
        self.created_at = existing.created_at;
        if self.current_version_id.is_none() {
            self.current_version_id = existing.current_version_id;
        }
        self.is_deleted = existing.is_deleted;
        if existing.status == DocumentStatus::Deleted {
            self.status = DocumentStatus::Deleted;
        } else if self.status == DocumentStatus::Deleted {
            self.status = existing.status;
        }
    }
}
