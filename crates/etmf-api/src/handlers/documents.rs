//! Document handlers: version upload, listing, download, archive, delete.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use etmf_core::error::AppError;
use etmf_entity::document::{Document, DocumentVersion};
use etmf_service::UploadVersion;

use crate::dto::response::MessageResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::validation(format!("Invalid multipart body: {}", e.body_text()))
}

/// POST /api/documents/{id}/versions
///
/// Multipart fields: `file` (required), `document_name`, `change_reason`.
pub async fn upload_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(document_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DocumentVersion>), ApiError> {
    let mut file = None;
    let mut document_name = None;
    let mut change_reason = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(String::from);
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((file_name, content_type, data));
            }
            Some("document_name") => {
                document_name = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("change_reason") => {
                change_reason = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::validation("Missing 'file' field"))?;

    let version = state
        .document_service
        .upload_version(
            &auth,
            document_id,
            UploadVersion {
                file_name,
                content_type,
                data,
                document_name,
                change_reason: change_reason.filter(|r| !r.trim().is_empty()),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(version)))
}

/// GET /api/documents/{id}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(document_id): Path<Uuid>,
) -> Result<Json<Vec<DocumentVersion>>, ApiError> {
    Ok(Json(
        state.document_service.list_versions(&auth, document_id).await?,
    ))
}

/// GET /api/documents/{id}/versions/{n}/download
pub async fn download_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((document_id, version_number)): Path<(Uuid, i32)>,
) -> Result<Response, ApiError> {
    let (version, stream) = state
        .document_service
        .download_version(&auth, document_id, version_number)
        .await?;

    let content_type = version
        .file_type
        .as_deref()
        .and_then(|t| HeaderValue::from_str(t).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        version.file_name.replace(['"', '\\', '\r', '\n'], "_")
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    let mut response = Body::from_stream(stream).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(version.file_size));
    if let Ok(etag) = HeaderValue::from_str(&format!("\"{}\"", version.checksum)) {
        headers.insert(header::ETAG, etag);
    }
    Ok(response)
}

/// POST /api/documents/{id}/archive
pub async fn archive(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(document_id): Path<Uuid>,
) -> Result<Json<Document>, ApiError> {
    Ok(Json(state.document_service.archive(&auth, document_id).await?))
}

/// DELETE /api/documents/{id}
pub async fn delete_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(document_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.document_service.soft_delete(&auth, document_id).await?;
    Ok(Json(MessageResponse::ok("Document deleted")))
}
