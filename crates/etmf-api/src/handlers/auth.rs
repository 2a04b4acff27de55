//! Auth handlers: login, logout, me.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use bytes::Bytes;
use tracing::info;
use validator::Validate;

use etmf_core::config::AuthConfig;
use etmf_core::error::AppError;
use etmf_entity::user::User;

use crate::dto::request::LoginRequest;
use crate::dto::response::{LoginResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, client_ip, user_agent};
use crate::state::AppState;

/// Body of every logout response.
pub const LOGOUT_MESSAGE: &str = "Logged out successfully";

fn session_cookie(config: &AuthConfig, token: String, max_age: chrono::Duration) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(config.cookie_secure)
        .max_age(cookie::time::Duration::seconds(max_age.num_seconds()))
        .build()
}

fn removal_cookie(config: &AuthConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build((config.cookie_name.clone(), ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(config.cookie_secure)
        .build();
    cookie.make_removal();
    cookie
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let req: LoginRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::validation(format!("Malformed login request: {e}")))?;
    req.validate()
        .map_err(|e| AppError::validation(format!("Validation failed: {e}")))?;

    let result = state
        .session_manager
        .login(
            &req.email,
            &req.password,
            &client_ip(&headers),
            user_agent(&headers).as_deref(),
        )
        .await?;

    let cookie = session_cookie(
        &state.config.auth,
        result.token,
        state.session_manager.session_lifetime(),
    );

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            user: result.user,
            session_id: result.session.id,
            expires_at: result.session.expires_at,
        }),
    ))
}

/// POST /api/auth/logout
///
/// Always succeeds: a missing, expired, or forged token is simply ignored.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let token = jar
        .get(&state.config.auth.cookie_name)
        .map(|c| c.value().to_string());

    if let Some(token) = token {
        if let Some(session_id) = state.session_manager.logout(&token).await {
            state.view_states.remove(session_id);
            info!(session_id = %session_id, "User logged out");
        }
    }

    (
        jar.add(removal_cookie(&state.config.auth)),
        Json(MessageResponse::ok(LOGOUT_MESSAGE)),
    )
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<User>, ApiError> {
    let user = state
        .store
        .find::<User>(auth.user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User no longer exists"))?;
    Ok(Json(user))
}
