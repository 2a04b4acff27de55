//! Investigator site entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::error::BoxDynError;
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, FromRow};
use uuid::Uuid;
use validator::Validate;

use crate::table::{Table, TableRow};

/// An investigator site participating in a study.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate)]
pub struct Site {
    /// Unique site identifier. Nil or absent on create.
    #[serde(default)]
    pub id: Uuid,
    /// The study this site belongs to.
    pub study_id: Uuid,
    /// Sponsor-assigned site number.
    #[validate(length(min = 1, max = 32))]
    pub site_number: String,
    /// Institution name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Country (ISO code or name) used for country-level navigation.
    #[validate(length(min = 1, max = 64))]
    pub country: String,
    /// Principal investigator.
    #[serde(default)]
    pub principal_investigator: Option<String>,
    /// When the site record was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl TableRow for Site {
    const TABLE: Table = Table::Sites;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "study_id",
        "site_number",
        "name",
        "country",
        "principal_investigator",
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
        args.add(self.site_number.clone())?;
        args.add(self.name.clone())?;
        args.add(self.country.clone())?;
        args.add(self.principal_investigator.clone())?;
        args.add(self.created_at)?;
        Ok(())
    }

    fn preserve_from(&mut self, existing: &Self) {
        self.created_at = existing.created_at;
    }
}
