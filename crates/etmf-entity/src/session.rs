//! Session entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::error::BoxDynError;
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, FromRow};
use uuid::Uuid;
use validator::Validate;

use crate::table::{Table, TableRow};

/// A login session.
///
/// Issued on login, invalidated on logout, and checked for expiry on every
/// request. The session token handed to the browser is a JWT whose `sid`
/// and `jti` claims point back at `id` and `token_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// JWT ID of the token issued for this session.
    pub token_id: Uuid,
    /// Client address at login.
    pub ip_address: String,
    /// User-Agent header at login.
    pub user_agent: Option<String>,
    /// When the session was issued.
    pub issued_at: DateTime<Utc>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// Last authenticated request.
    pub last_activity_at: DateTime<Utc>,
    /// When the session was invalidated by logout.
    pub invalidated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Check whether the session is still usable (not invalidated, not expired).
    pub fn is_active(&self) -> bool {
        self.invalidated_at.is_none() && self.expires_at > Utc::now()
    }

    /// Check whether the absolute lifetime has elapsed.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Check whether the session has been idle longer than `idle`.
    pub fn is_idle(&self, idle: Duration) -> bool {
        Utc::now() - self.last_activity_at > idle
    }
}

impl TableRow for Session {
    const TABLE: Table = Table::Sessions;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "token_id",
        "ip_address",
        "user_agent",
        "issued_at",
        "expires_at",
        "last_activity_at",
        "invalidated_at",
    ];
    const ORDER_BY: &'static str = "issued_at ASC";

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn bind_columns(&self, args: &mut PgArguments) -> Result<(), BoxDynError> {
        args.add(self.id)?;
        args.add(self.user_id)?;
        args.add(self.token_id)?;
        args.add(self.ip_address.clone())?;
        args.add(self.user_agent.clone())?;
        args.add(self.issued_at)?;
        args.add(self.expires_at)?;
        args.add(self.last_activity_at)?;
        args.add(self.invalidated_at)?;
        Ok(())
    }
}
