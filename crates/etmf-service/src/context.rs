//! Request context carrying the authenticated user and session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use etmf_core::error::AppError;
use etmf_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Built by the API layer from a validated session and passed into service
/// methods so that every operation knows *who* is acting and from *which*
/// session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The current session ID.
    pub session_id: Uuid,
    /// The user's current role.
    pub role: UserRole,
    /// The user's e-mail.
    pub email: String,
    /// IP address of the request origin.
    pub ip_address: String,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(
        user_id: Uuid,
        session_id: Uuid,
        role: UserRole,
        email: String,
        ip_address: String,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            user_id,
            session_id,
            role,
            email,
            ip_address,
            user_agent,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Fails with `Forbidden` unless the user holds at least `role`.
    pub fn require_role(&self, role: UserRole) -> Result<(), AppError> {
        if self.role.has_at_least(&role) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "This action requires the '{role}' role or higher"
            )))
        }
    }
}
