//! TMF folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::error::BoxDynError;
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, FromRow};
use uuid::Uuid;
use validator::Validate;

use crate::table::{Table, TableRow};

/// Level of the TMF hierarchy a folder (or the UI navigation) sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "tmf_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TmfLevel {
    /// Study-wide (trial) level.
    Trial,
    /// Country level.
    Country,
    /// Site level.
    Site,
}

/// A folder in a study's TMF structure.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate)]
pub struct Folder {
    /// Unique folder identifier. Nil or absent on create.
    #[serde(default)]
    pub id: Uuid,
    /// The study this folder belongs to.
    pub study_id: Uuid,
    /// Parent folder, `None` for a root folder.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Folder name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// TMF level this folder is filed at.
    pub level: TmfLevel,
    /// TMF reference model zone.
    #[serde(default)]
    pub zone: Option<String>,
    /// TMF reference model artifact.
    #[serde(default)]
    pub artifact: Option<String>,
    /// When the folder was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl TableRow for Folder {
    const TABLE: Table = Table::Folders;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "study_id",
        "parent_id",
        "name",
        "level",
        "zone",
        "artifact",
        "created_at",
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
        args.add(self.parent_id)?;
        args.add(self.name.clone())?;
        args.add(self.level)?;
        args.add(self.zone.clone())?;
        args.add(self.artifact.clone())?;
        args.add(self.created_at)?;
        Ok(())
    }

    fn preserve_from(&mut self, existing: &Self) {
        self.created_at = existing.created_at;
    }
}
