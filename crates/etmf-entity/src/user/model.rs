//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::error::BoxDynError;
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, FromRow};
use uuid::Uuid;
use validator::Validate;

use super::role::UserRole;
use crate::table::{Table, TableRow};

/// A portal user account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate)]
pub struct User {
    /// Unique user identifier. Nil or absent on create.
    #[serde(default)]
    pub id: Uuid,
    /// Login e-mail address.
    #[validate(email)]
    pub email: String,
    /// Name shown in the UI.
    #[validate(length(min = 1, max = 255))]
    pub display_name: String,
    /// Access role.
    #[serde(default)]
    pub role: UserRole,
    /// Inactive users cannot log in.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Argon2id hash. Never read from or written to request/response bodies.
    #[serde(skip)]
    pub password_hash: String,
    /// Write-only plaintext password accepted on create/update; hashed by
    /// the users route before the row reaches the store.
    #[serde(default, skip_serializing)]
    #[sqlx(skip)]
    pub password: Option<String>,
    /// When the account was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether the account can authenticate at all.
    pub fn can_login(&self) -> bool {
        self.is_active && !self.password_hash.is_empty()
    }
}

fn default_active() -> bool {
    true
}

impl TableRow for User {
    const TABLE: Table = Table::Users;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "email",
        "display_name",
        "role",
        "is_active",
        "password_hash",
        "created_at",
    ];
    const ORDER_BY: &'static str = "email ASC";
    const UNIQUE: &'static [&'static str] = &["email"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn bind_columns(&self, args: &mut PgArguments) -> Result<(), BoxDynError> {
        args.add(self.id)?;
        args.add(self.email.clone())?;
        args.add(self.display_name.clone())?;
        args.add(self.role)?;
        args.add(self.is_active)?;
        args.add(self.password_hash.clone())?;
        args.add(self.created_at)?;
        Ok(())
    }

    fn preserve_from(&mut self, existing: &Self) {
        self.created_at = existing.created_at;
        if self.password_hash.is_empty() {
            self.password_hash = existing.password_hash.clone();
        }
    }
}
