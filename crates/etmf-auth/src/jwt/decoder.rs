//! Session token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use etmf_core::config::AuthConfig;
use etmf_core::error::AppError;

use super::claims::Claims;

/// Verifies session token signatures and expiry.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes a token, checking signature and expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_with(token, &self.validation)
    }

    /// Decodes a token, checking the signature only. Used on logout, where
    /// an expired token still identifies the session to close.
    pub fn decode_ignoring_expiry(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = self.validation.clone();
        validation.validate_exp = false;
        validation.required_spec_claims.remove("exp");
        self.decode_with(token, &validation)
    }

    fn decode_with(&self, token: &str, validation: &Validation) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::unauthorized("Session has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::unauthorized("Invalid session token signature")
                }
                _ => AppError::unauthorized(format!("Invalid session token: {e}")),
            })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::jwt::JwtEncoder;
    use etmf_entity::session::Session;
    use etmf_entity::user::{User, UserRole};

    fn fixtures(expires_in: Duration) -> (User, Session) {
        let user = User {
            id: Uuid::new_v4(),
            email: "qa@example.org".into(),
            display_name: "QA".into(),
            role: UserRole::Manager,
            is_active: true,
            password_hash: String::new(),
            password: None,
            created_at: Utc::now(),
        };
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id: user.id,
            token_id: Uuid::new_v4(),
            ip_address: "10.0.0.1".into(),
            user_agent: None,
            issued_at: now - Duration::hours(1),
            expires_at: now + expires_in,
            last_activity_at: now,
            invalidated_at: None,
        };
        (user, session)
    }

    #[test]
    fn test_round_trip_claims() {
        let config = AuthConfig::default();
        let (user, session) = fixtures(Duration::hours(1));
        let token = JwtEncoder::new(&config)
            .encode_session_token(&user, &session)
            .unwrap();

        let claims = JwtDecoder::new(&config).decode(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.sid, session.id);
        assert_eq!(claims.jti, session.token_id);
        assert_eq!(claims.role, UserRole::Manager);
        assert_eq!(claims.email, "qa@example.org");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (user, session) = fixtures(Duration::hours(1));
        let token = JwtEncoder::new(&AuthConfig::default())
            .encode_session_token(&user, &session)
            .unwrap();

        let mut other = AuthConfig::default();
        other.jwt_secret = "a-different-secret".into();
        let err = JwtDecoder::new(&other).decode(&token).unwrap_err();
        assert_eq!(err.kind, etmf_core::error::ErrorKind::Unauthorized);
    }

    #[test]
    fn test_expired_token_only_decodes_ignoring_expiry() {
        let config = AuthConfig::default();
        let (user, session) = fixtures(Duration::minutes(-10));
        let token = JwtEncoder::new(&config)
            .encode_session_token(&user, &session)
            .unwrap();

        let decoder = JwtDecoder::new(&config);
        assert!(decoder.decode(&token).is_err());
        assert_eq!(
            decoder.decode_ignoring_expiry(&token).unwrap().sid,
            session.id
        );
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(JwtDecoder::new(&AuthConfig::default()).decode("abc.def").is_err());
    }
}
