//! Upload parameters for a new document version.

use bytes::Bytes;

/// One uploaded file, as received from a multipart request.
#[derive(Debug, Clone)]
pub struct UploadVersion {
    /// Original file name; its extension becomes the object's extension.
    pub file_name: String,
    /// MIME type reported by the client.
    pub content_type: Option<String>,
    /// File content.
    pub data: Bytes,
    /// Display name for this version. Defaults to the previous version's
    /// name, then to the file name.
    pub document_name: Option<String>,
    /// Free-text reason for the revision.
    pub change_reason: Option<String>,
}
