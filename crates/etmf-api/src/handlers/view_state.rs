//! View-state handlers: the per-session navigation and studies
//! containers.

use axum::Json;
use axum::extract::State;
use bytes::Bytes;
use serde::Serialize;

use etmf_core::error::AppError;
use etmf_entity::study::Study;
use etmf_service::view::NavigationPatch;
use etmf_service::{NavigationState, StudiesState, TableDispatcher, ViewState};

use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Result of saving a study through the studies container.
#[derive(Debug, Clone, Serialize)]
pub struct StudySaved {
    /// The study as stored.
    pub study: Study,
    /// The container after the save.
    pub state: StudiesState,
}

/// GET /api/view-state
pub async fn get_view_state(State(state): State<AppState>, auth: AuthUser) -> Json<ViewState> {
    Json(state.view_states.get(auth.session_id))
}

/// GET /api/view-state/navigation
pub async fn get_navigation(State(state): State<AppState>, auth: AuthUser) -> Json<NavigationState> {
    Json(state.view_states.get(auth.session_id).navigation)
}

/// PATCH /api/view-state/navigation
pub async fn patch_navigation(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Bytes,
) -> Result<Json<NavigationState>, ApiError> {
    let patch: NavigationPatch = serde_json::from_slice(&body)
        .map_err(|e| AppError::validation(format!("Malformed navigation patch: {e}")))?;
    Ok(Json(state.view_states.update_navigation(auth.session_id, patch)))
}

/// DELETE /api/view-state/navigation
pub async fn reset_navigation(State(state): State<AppState>, auth: AuthUser) -> Json<NavigationState> {
    Json(state.view_states.reset_navigation(auth.session_id))
}

/// GET /api/view-state/studies
pub async fn get_studies(State(state): State<AppState>, auth: AuthUser) -> Json<StudiesState> {
    Json(state.view_states.get(auth.session_id).studies)
}

/// POST /api/view-state/studies/load
///
/// A failed load is reported in the container's `error` field, not as an
/// error response.
pub async fn load_studies(State(state): State<AppState>, auth: AuthUser) -> Json<StudiesState> {
    let current = state.view_states.get(auth.session_id).studies;
    let loaded = current.load(&state.dispatcher, &auth).await;
    state.view_states.set_studies(auth.session_id, loaded.clone());
    Json(loaded)
}

/// POST /api/view-state/studies/save
pub async fn save_study(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Bytes,
) -> Result<Json<StudySaved>, ApiError> {
    let study = TableDispatcher::parse_body::<Study>(&body)?;
    let current = state.view_states.get(auth.session_id).studies;
    let (next, study) = current.save(&state.dispatcher, &auth, study).await?;
    state.view_states.set_studies(auth.session_id, next.clone());
    Ok(Json(StudySaved { study, state: next }))
}
