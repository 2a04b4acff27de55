//! Study entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::error::BoxDynError;
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, FromRow};
use uuid::Uuid;
use validator::Validate;

use crate::table::{Table, TableRow};

/// A clinical study; the top-level scope for sites, folders, and documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate)]
pub struct Study {
    /// Unique study identifier. Nil or absent on create.
    #[serde(default)]
    pub id: Uuid,
    /// Sponsor protocol number.
    #[validate(length(min = 1, max = 64))]
    pub protocol_number: String,
    /// Study title.
    #[validate(length(min = 1, max = 512))]
    pub title: String,
    /// Sponsor organisation.
    #[serde(default)]
    pub sponsor: Option<String>,
    /// Clinical phase (e.g. "II", "III").
    #[serde(default)]
    #[validate(length(max = 16))]
    pub phase: Option<String>,
    /// When the study record was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl TableRow for Study {
    const TABLE: Table = Table::Studies;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "protocol_number",
        "title",
        "sponsor",
        "phase",
        "created_at",
    ];
    const UNIQUE: &'static [&'static str] = &["protocol_number"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn bind_columns(&self, args: &mut PgArguments) -> Result<(), BoxDynError> {
        args.add(self.id)?;
        args.add(self.protocol_number.clone())?;
        args.add(self.title.clone())?;
        args.add(self.sponsor.clone())?;
        args.add(self.phase.clone())?;
        args.add(self.created_at)?;
        Ok(())
    }

    fn preserve_from(&mut self, existing: &Self) {
        self.created_at = existing.created_at;
    }
}
