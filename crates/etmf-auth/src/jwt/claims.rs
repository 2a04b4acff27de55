//! Payload of the `auth-token` cookie.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use etmf_entity::session::Session;
use etmf_entity::user::{User, UserRole};

/// Claims of a session token. The token is only a pointer: every request
/// re-checks the stored session the claims name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: Uuid,
    /// Session ID.
    pub sid: Uuid,
    /// Role when the session opened. Informational; authorization reads the
    /// stored user.
    pub role: UserRole,
    /// E-mail when the session opened.
    pub email: String,
    /// Issued at, seconds since epoch.
    pub iat: i64,
    /// Session hard expiry, seconds since epoch.
    pub exp: i64,
    /// Equals the session's `token_id`.
    pub jti: Uuid,
}

impl Claims {
    /// Claims for a freshly opened `session` of `user`.
    pub fn for_session(user: &User, session: &Session) -> Self {
        Self {
            sub: user.id,
            sid: session.id,
            role: user.role,
            email: user.email.clone(),
            iat: session.issued_at.timestamp(),
            exp: session.expires_at.timestamp(),
            jti: session.token_id,
        }
    }

    /// Whether `session` is the one this token was issued for.
    pub fn names(&self, session: &Session) -> bool {
        session.id == self.sid && session.token_id == self.jti && session.user_id == self.sub
    }
}
