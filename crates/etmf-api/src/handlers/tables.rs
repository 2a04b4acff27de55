//! Table routes: fixed resource routes and the name-dispatched
//! `/tables/{table}` route, all backed by the table dispatcher.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use etmf_core::error::AppError;
use etmf_core::result::AppResult;
use etmf_entity::document::{Document, DocumentVersion};
use etmf_entity::folder::Folder;
use etmf_entity::site::Site;
use etmf_entity::study::Study;
use etmf_entity::user::User;
use etmf_entity::{Table, TableOperation, TableRow};
use etmf_service::{RequestContext, TableDispatcher, Upserted, parse_record_id};

use crate::dto::request::RecordQuery;
use crate::dto::response::{DocumentWithBadge, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Runs `$body` with `$row` bound to the row type of `$table`.
macro_rules! with_row_type {
    ($table:expr, $row:ident => $body:expr) => {
        match $table {
            Table::Studies => {
                type $row = Study;
                $body
            }
            Table::Sites => {
                type $row = Site;
                $body
            }
            Table::Users => {
                type $row = User;
                $body
            }
            Table::Folders => {
                type $row = Folder;
                $body
            }
            Table::Documents => {
                type $row = Document;
                $body
            }
            Table::DocumentVersions => {
                type $row = DocumentVersion;
                $body
            }
            Table::Sessions => Err(AppError::validation("Unknown table: 'sessions'").into()),
        }
    };
}

fn upserted_response<R: TableRow>(result: Upserted<R>) -> Response {
    let status = if result.is_inserted() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(result.into_inner())).into_response()
}

/// Parses a user body, hashing `password` when present.
async fn save_user(state: &AppState, ctx: &RequestContext, body: &[u8]) -> AppResult<Upserted<User>> {
    TableDispatcher::authorize::<User>(ctx, TableOperation::Write)?;
    let mut user = TableDispatcher::parse_body::<User>(body)?;
    if let Some(password) = user.password.take() {
        state.password_policy.validate(&password)?;
        user.password_hash = state.password_hasher.hash_password(&password)?;
    }
    state.dispatcher.save(ctx, user).await
}

/// Writes a row of any table, routing users and documents through their
/// extra rules.
async fn write_row<R: TableRow>(state: &AppState, ctx: &RequestContext, body: &[u8]) -> Result<Response, ApiError> {
    let response = match R::TABLE {
        Table::Users => upserted_response(save_user(state, ctx, body).await?),
        Table::Documents => upserted_response(state.document_service.save_document(ctx, body).await?),
        _ => upserted_response(state.dispatcher.create_or_update::<R>(ctx, body).await?),
    };
    Ok(response)
}

async fn delete_row<R: TableRow>(
    state: &AppState,
    ctx: &RequestContext,
    query: &RecordQuery,
    body: &[u8],
) -> Result<Json<MessageResponse>, ApiError> {
    TableDispatcher::authorize::<R>(ctx, TableOperation::Delete)?;
    let id = parse_record_id(query.id.as_deref(), body)?;
    state.dispatcher.delete_record::<R>(ctx, id).await?;
    Ok(Json(MessageResponse::ok("Record deleted")))
}

/// GET /api/{resource}
pub async fn list<R: TableRow>(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<R>>, ApiError> {
    Ok(Json(state.dispatcher.get_table::<R>(&auth).await?))
}

/// POST /api/{resource}
pub async fn upsert<R: TableRow>(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Bytes,
) -> Result<Response, ApiError> {
    write_row::<R>(&state, &auth, &body).await
}

/// DELETE /api/{resource}
pub async fn remove<R: TableRow>(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<RecordQuery>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    delete_row::<R>(&state, &auth, &query, &body).await
}

/// GET /api/documents: visible documents with their status badges.
pub async fn list_documents(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<DocumentWithBadge>>, ApiError> {
    let documents = state.document_service.list_documents(&auth).await?;
    Ok(Json(documents.into_iter().map(DocumentWithBadge::from).collect()))
}

fn resolve_table(name: &str) -> AppResult<Table> {
    name.parse::<Table>()
}

/// GET /api/tables/{table}
pub async fn list_named(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let table = resolve_table(&name)?;
    with_row_type!(table, R => {
        let rows = state.dispatcher.get_table::<R>(&auth).await?;
        Ok(Json(rows).into_response())
    })
}

/// POST /api/tables/{table}
pub async fn upsert_named(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let table = resolve_table(&name)?;
    with_row_type!(table, R => write_row::<R>(&state, &auth, &body).await)
}

/// DELETE /api/tables/{table}
pub async fn remove_named(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(name): Path<String>,
    Query(query): Query<RecordQuery>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let table = resolve_table(&name)?;
    with_row_type!(table, R => {
        let response = delete_row::<R>(&state, &auth, &query, &body).await?;
        Ok(response.into_response())
    })
}
