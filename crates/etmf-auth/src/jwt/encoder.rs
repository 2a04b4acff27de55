//! Session token signing.

use jsonwebtoken::{EncodingKey, Header, encode};

use etmf_core::config::AuthConfig;
use etmf_core::error::AppError;
use etmf_entity::session::Session;
use etmf_entity::user::User;

use super::claims::Claims;

/// Creates HS256-signed session tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder").finish_non_exhaustive()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    /// Sign a token for `session`. The token expires with the session.
    pub fn encode_session_token(&self, user: &User, session: &Session) -> Result<String, AppError> {
        let claims = Claims::for_session(user, session);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode session token: {e}")))
    }
}
