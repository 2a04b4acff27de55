//! Session lifecycle manager: login, validation, logout.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use etmf_core::config::{AuthConfig, SessionConfig};
use etmf_core::error::AppError;
use etmf_core::result::AppResult;
use etmf_database::TableStore;
use etmf_entity::session::Session;
use etmf_entity::user::User;

use crate::jwt::{Claims, JwtDecoder, JwtEncoder};
use crate::password::PasswordHasher;

/// Message returned for every credential failure, so that callers cannot
/// tell unknown accounts from wrong passwords.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// The created session.
    pub session: Session,
    /// The authenticated user.
    pub user: User,
    /// Signed token to place in the session cookie.
    pub token: String,
}

/// A session that passed validation, with its owner.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    /// The live session.
    pub session: Session,
    /// The session's user, as currently stored.
    pub user: User,
}

/// Manages the complete session lifecycle.
#[derive(Clone)]
pub struct SessionManager {
    store: TableStore,
    password_hasher: Arc<PasswordHasher>,
    jwt_encoder: Arc<JwtEncoder>,
    jwt_decoder: Arc<JwtDecoder>,
    session_config: SessionConfig,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("backend", &self.store.backend_name())
            .field("session_config", &self.session_config)
            .finish()
    }
}

impl SessionManager {
    /// Creates a session manager over `store`.
    pub fn new(
        store: TableStore,
        password_hasher: Arc<PasswordHasher>,
        auth_config: &AuthConfig,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            store,
            password_hasher,
            jwt_encoder: Arc::new(JwtEncoder::new(auth_config)),
            jwt_decoder: Arc::new(JwtDecoder::new(auth_config)),
            session_config,
        }
    }

    /// Absolute session lifetime.
    pub fn session_lifetime(&self) -> Duration {
        self.session_config.lifetime()
    }

    fn idle_timeout(&self) -> Duration {
        self.session_config.idle_timeout()
    }

    /// Verifies credentials and opens a new session.
    ///
    /// The user must exist, be active, and match the stored hash; any
    /// failure is reported as the same `Unauthorized` error.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip_address: &str,
        user_agent: Option<&str>,
    ) -> AppResult<LoginResult> {
        let user = self
            .store
            .find_first_by::<User>("email", email.trim())
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

        if !user.can_login() {
            warn!(user_id = %user.id, "Login attempt for disabled account");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        if !self
            .password_hasher
            .verify_password(password, &user.password_hash)?
        {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id: user.id,
            token_id: Uuid::new_v4(),
            ip_address: ip_address.to_string(),
            user_agent: user_agent.map(str::to_string),
            issued_at: now,
            expires_at: now + self.session_lifetime(),
            last_activity_at: now,
            invalidated_at: None,
        };
        let session = self.store.insert(&session).await?;
        let token = self.jwt_encoder.encode_session_token(&user, &session)?;

        info!(user_id = %user.id, session_id = %session.id, "Login successful");
        Ok(LoginResult {
            session,
            user,
            token,
        })
    }

    /// Validates a session token and records activity on the session.
    pub async fn validate(&self, token: &str) -> AppResult<AuthenticatedSession> {
        let claims = self.jwt_decoder.decode(token)?;
        let mut session = self.load_session(&claims).await?;

        if session.invalidated_at.is_some() {
            return Err(AppError::unauthorized("Session has been logged out"));
        }
        if session.is_expired() {
            return Err(AppError::unauthorized("Session has expired"));
        }
        if session.is_idle(self.idle_timeout()) {
            debug!(session_id = %session.id, "Closing idle session");
            session.invalidated_at = Some(Utc::now());
            self.store.update(&session).await?;
            return Err(AppError::unauthorized("Session timed out due to inactivity"));
        }

        let user = self
            .store
            .find::<User>(session.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::unauthorized("User is no longer active"))?;

        session.last_activity_at = Utc::now();
        let session = self
            .store
            .update(&session)
            .await?
            .ok_or_else(|| AppError::unauthorized("Session not found"))?;

        Ok(AuthenticatedSession { session, user })
    }

    /// Closes the session a token belongs to.
    ///
    /// Never fails: unknown, malformed, or already closed tokens are ignored.
    /// Returns the closed session's ID, if one was closed.
    pub async fn logout(&self, token: &str) -> Option<Uuid> {
        let claims = match self.jwt_decoder.decode_ignoring_expiry(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Logout with unusable token");
                return None;
            }
        };

        let mut session = match self.load_session(&claims).await {
            Ok(session) if session.invalidated_at.is_none() => session,
            Ok(_) => return None,
            Err(e) => {
                debug!(error = %e, "Logout for unknown session");
                return None;
            }
        };

        session.invalidated_at = Some(Utc::now());
        match self.store.update(&session).await {
            Ok(_) => {
                info!(session_id = %session.id, user_id = %session.user_id, "Logged out");
                Some(session.id)
            }
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "Failed to invalidate session");
                None
            }
        }
    }

    /// Deletes sessions that are logged out, expired, or idle past the
    /// timeout. Returns the ids of the removed sessions.
    pub async fn purge_expired(&self) -> AppResult<Vec<Uuid>> {
        let idle = self.idle_timeout();
        let mut removed = Vec::new();
        for session in self.store.list::<Session>().await? {
            if (!session.is_active() || session.is_idle(idle))
                && self.store.delete::<Session>(session.id).await?
            {
                removed.push(session.id);
            }
        }
        if !removed.is_empty() {
            info!(removed = removed.len(), "Purged expired sessions");
        }
        Ok(removed)
    }

    async fn load_session(&self, claims: &Claims) -> AppResult<Session> {
        self.store
            .find::<Session>(claims.sid)
            .await?
            .filter(|s| claims.names(s))
            .ok_or_else(|| AppError::unauthorized("Session not found"))
    }
}
