//! Route definitions for the eTMF HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};

use etmf_entity::document::DocumentVersion;
use etmf_entity::folder::Folder;
use etmf_entity::site::Site;
use etmf_entity::study::Study;
use etmf_entity::user::User;

use crate::handlers;
use crate::handlers::tables;
use crate::middleware;
use crate::state::AppState;

/// Room left for multipart framing and the text fields of an upload.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Build the Axum router with all routes and the body-limit and logging
/// middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = (state.config.storage.max_upload_size_bytes as usize)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(table_routes())
        .merge(document_routes())
        .merge(view_state_routes())
        .merge(badge_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Auth endpoints: login, logout, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
}

/// Fixed resource routes and the name-dispatched table route
fn table_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/site",
            get(tables::list::<Site>)
                .post(tables::upsert::<Site>)
                .delete(tables::remove::<Site>),
        )
        .route(
            "/users",
            get(tables::list::<User>)
                .post(tables::upsert::<User>)
                .delete(tables::remove::<User>),
        )
        .route(
            "/studies",
            get(tables::list::<Study>)
                .post(tables::upsert::<Study>)
                .delete(tables::remove::<Study>),
        )
        .route(
            "/folders",
            get(tables::list::<Folder>)
                .post(tables::upsert::<Folder>)
                .delete(tables::remove::<Folder>),
        )
        .route(
            "/documents",
            get(tables::list_documents).post(tables::upsert::<etmf_entity::document::Document>),
        )
        .route("/document-versions", get(tables::list::<DocumentVersion>))
        .route(
            "/tables/{table}",
            get(tables::list_named)
                .post(tables::upsert_named)
                .delete(tables::remove_named),
        )
}

/// Document versioning and lifecycle
fn document_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/documents/{id}",
            axum::routing::delete(handlers::documents::delete_document),
        )
        .route(
            "/documents/{id}/versions",
            get(handlers::documents::list_versions).post(handlers::documents::upload_version),
        )
        .route(
            "/documents/{id}/versions/{n}/download",
            get(handlers::documents::download_version),
        )
        .route("/documents/{id}/archive", post(handlers::documents::archive))
}

/// Per-session view state
fn view_state_routes() -> Router<AppState> {
    Router::new()
        .route("/view-state", get(handlers::view_state::get_view_state))
        .route(
            "/view-state/navigation",
            get(handlers::view_state::get_navigation)
                .patch(handlers::view_state::patch_navigation)
                .delete(handlers::view_state::reset_navigation),
        )
        .route("/view-state/studies", get(handlers::view_state::get_studies))
        .route(
            "/view-state/studies/load",
            post(handlers::view_state::load_studies),
        )
        .route(
            "/view-state/studies/save",
            post(handlers::view_state::save_study),
        )
}

/// Status badges
fn badge_routes() -> Router<AppState> {
    Router::new().route("/badges/{status}", get(handlers::badges::get_badge))
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
