//! Document service: version upload and download, archive, soft delete,
//! and the current-version invariant.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};
use uuid::Uuid;

use etmf_core::error::AppError;
use etmf_core::result::AppResult;
use etmf_core::traits::storage::ByteStream;
use etmf_database::TableStore;
use etmf_entity::document::{Document, DocumentStatus, DocumentVersion};
use etmf_entity::user::UserRole;
use etmf_storage::checksum::sha256_hex;
use etmf_storage::{StorageManager, build_version_key, extension_of};

use super::version::UploadVersion;
use crate::context::RequestContext;
use crate::table::{TableDispatcher, Upserted};

type LockMap = DashMap<Uuid, Arc<Mutex<()>>>;

/// Exclusive hold on one document's row and version numbering.
///
/// Dropping it releases the lock and removes the map entry once no other
/// task holds or waits on it.
struct DocumentLock {
    locks: Arc<LockMap>,
    document_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for DocumentLock {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .remove_if(&self.document_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Manages documents and their stored versions.
#[derive(Debug, Clone)]
pub struct DocumentService {
    dispatcher: TableDispatcher,
    storage: StorageManager,
    /// Serializes writes to each document row and its version numbering.
    document_locks: Arc<LockMap>,
    max_upload_size_bytes: u64,
}

impl DocumentService {
    /// Creates a document service.
    pub fn new(dispatcher: TableDispatcher, storage: StorageManager, max_upload_size_bytes: u64) -> Self {
        Self {
            dispatcher,
            storage,
            document_locks: Arc::new(DashMap::new()),
            max_upload_size_bytes,
        }
    }

    fn store(&self) -> &TableStore {
        self.dispatcher.store()
    }

    /// Lists documents that are not soft-deleted.
    pub async fn list_documents(&self, ctx: &RequestContext) -> AppResult<Vec<Document>> {
        let documents = self.dispatcher.get_table::<Document>(ctx).await?;
        Ok(documents.into_iter().filter(Document::is_visible).collect())
    }

    /// Parses and saves a document, enforcing the current-version invariant.
    ///
    /// New documents are attributed to the caller. A soft-deleted document
    /// cannot be updated, and deletion happens only through
    /// [`soft_delete`](Self::soft_delete).
    pub async fn save_document(&self, ctx: &RequestContext, body: &[u8]) -> AppResult<Upserted<Document>> {
        TableDispatcher::authorize::<Document>(ctx, etmf_entity::TableOperation::Write)?;
        let mut document = TableDispatcher::parse_body::<Document>(body)?;
        if document.status == DocumentStatus::Deleted || document.is_deleted {
            return Err(AppError::validation(
                "Documents are deleted with DELETE /api/documents/{id}",
            ));
        }
        if document.created_by.is_nil() {
            document.created_by = ctx.user_id;
        }
        if document.id.is_nil() {
            document.id = Uuid::new_v4();
        }

        let _lock = self.lock_document(document.id).await;
        if let Some(existing) = self.store().find::<Document>(document.id).await? {
            if !existing.is_visible() {
                return Err(AppError::not_found(format!("Document {} not found", document.id)));
            }
        }
        self.check_current_version(&document).await?;
        self.dispatcher.save(ctx, document).await
    }

    /// `current_version_id`, when set, must name a version of this document.
    pub async fn check_current_version(&self, document: &Document) -> AppResult<()> {
        let Some(version_id) = document.current_version_id else {
            return Ok(());
        };
        match self.store().find::<DocumentVersion>(version_id).await? {
            Some(version) if version.document_id == document.id => Ok(()),
            _ => Err(AppError::validation(format!(
                "current_version_id {version_id} is not a version of document {}",
                document.id
            ))),
        }
    }

    async fn find_live_document(&self, document_id: Uuid) -> AppResult<Document> {
        self.store()
            .find::<Document>(document_id)
            .await?
            .filter(Document::is_visible)
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))
    }

    async fn lock_document(&self, document_id: Uuid) -> DocumentLock {
        let lock = self
            .document_locks
            .entry(document_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        DocumentLock {
            locks: Arc::clone(&self.document_locks),
            document_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Stores a new version of a document.
    ///
    /// The version number is one past the highest stored number, assigned
    /// under a per-document lock. The object is written before the version
    /// row; if the row cannot be inserted the object is removed again.
    pub async fn upload_version(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        upload: UploadVersion,
    ) -> AppResult<DocumentVersion> {
        ctx.require_role(UserRole::Contributor)?;

        if upload.data.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }
        if upload.data.len() as u64 > self.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds the maximum upload size of {} bytes",
                self.max_upload_size_bytes
            )));
        }
        if upload.file_name.trim().is_empty() {
            return Err(AppError::validation("Uploaded file has no name"));
        }

        let _lock = self.lock_document(document_id).await;

        let document = self.find_live_document(document_id).await?;
        if !document.status.accepts_uploads() {
            return Err(AppError::conflict(format!(
                "Document {document_id} is {} and cannot receive new versions",
                document.status
            )));
        }

        let existing = self
            .store()
            .list_by::<DocumentVersion>("document_id", document_id)
            .await?;
        let latest = existing.iter().max_by_key(|v| v.document_version);
        let version_number = latest.map_or(1, |v| v.document_version + 1);

        let version_id = Uuid::new_v4();
        let extension = extension_of(&upload.file_name);
        let key = build_version_key(
            document.study_id,
            document.folder_id,
            document.id,
            version_number,
            version_id,
            &extension,
        );

        let document_name = upload
            .document_name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| latest.map(|v| v.document_name.clone()))
            .unwrap_or_else(|| upload.file_name.clone());

        let version = DocumentVersion {
            id: version_id,
            document_id,
            document_version: version_number,
            document_name,
            file_name: upload.file_name,
            file_path: key.clone(),
            file_type: upload.content_type,
            file_size: upload.data.len() as i64,
            checksum: sha256_hex(&upload.data),
            uploaded_by: ctx.user_id,
            uploaded_at: Utc::now(),
            change_reason: upload.change_reason,
        };

        let provider = self.storage.get_default().await?;
        provider.write(&key, upload.data).await?;

        let version = match self.store().insert(&version).await {
            Ok(version) => version,
            Err(e) => {
                if let Err(cleanup) = provider.delete(&key).await {
                    warn!(key = %key, error = %cleanup, "Failed to remove orphaned version object");
                }
                return Err(e);
            }
        };

        let mut document = self.find_live_document(document_id).await?;
        document.current_version_id = Some(version.id);
        self.store()
            .update(&document)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;

        info!(
            user_id = %ctx.user_id,
            document_id = %document_id,
            version = version_number,
            key = %key,
            bytes = version.file_size,
            "Document version uploaded"
        );
        Ok(version)
    }

    /// Lists a document's versions in ascending order.
    pub async fn list_versions(&self, ctx: &RequestContext, document_id: Uuid) -> AppResult<Vec<DocumentVersion>> {
        ctx.require_role(UserRole::Viewer)?;
        self.find_live_document(document_id).await?;
        self.store()
            .list_by::<DocumentVersion>("document_id", document_id)
            .await
    }

    /// Opens the stored content of version `version_number`.
    ///
    /// The storage key is rebuilt from the document and version and must
    /// equal the recorded `file_path`.
    pub async fn download_version(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        version_number: i32,
    ) -> AppResult<(DocumentVersion, ByteStream)> {
        let versions = self.list_versions(ctx, document_id).await?;
        let version = versions
            .into_iter()
            .find(|v| v.document_version == version_number)
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Version {version_number} of document {document_id} not found"
                ))
            })?;
        let document = self.find_live_document(document_id).await?;

        let key = build_version_key(
            document.study_id,
            document.folder_id,
            document.id,
            version.document_version,
            version.id,
            extension_of(&version.file_name),
        );
        if key != version.file_path {
            return Err(AppError::internal(format!(
                "Stored path of version {} does not match its storage key",
                version.id
            )));
        }

        let stream = self.storage.get_default().await?.read(&key).await?;
        info!(user_id = %ctx.user_id, document_id = %document_id, version = version_number, "Document version downloaded");
        Ok((version, stream))
    }

    /// Marks a document archived.
    pub async fn archive(&self, ctx: &RequestContext, document_id: Uuid) -> AppResult<Document> {
        ctx.require_role(UserRole::Contributor)?;
        let _lock = self.lock_document(document_id).await;
        let mut document = self.find_live_document(document_id).await?;
        document.status = DocumentStatus::Archived;
        let document = self
            .store()
            .update(&document)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;
        info!(user_id = %ctx.user_id, document_id = %document_id, "Document archived");
        Ok(document)
    }

    /// Soft-deletes a document; its versions and stored objects are kept.
    pub async fn soft_delete(&self, ctx: &RequestContext, document_id: Uuid) -> AppResult<Document> {
        ctx.require_role(UserRole::Contributor)?;
        let _lock = self.lock_document(document_id).await;
        let mut document = self.find_live_document(document_id).await?;
        document.is_deleted = true;
        document.status = DocumentStatus::Deleted;
        let document = self
            .store()
            .update(&document)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;
        info!(user_id = %ctx.user_id, document_id = %document_id, "Document deleted");
        Ok(document)
    }
}
