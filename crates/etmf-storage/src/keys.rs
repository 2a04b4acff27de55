//! Object storage keys for document versions.
//!
//! Every stored revision lives at
//! `documents/{study}/{folder}/{document}/v{n}/{version_id}.{ext}`. The shape
//! is persisted in `document_versions.file_path` and must never change.

use std::fmt;

/// Extension used when a file name carries none.
pub const DEFAULT_EXTENSION: &str = "bin";

const ROOT_PREFIX: &str = "documents";

/// Build the object storage key for one document version.
///
/// Pure and total: any displayable identifiers are accepted verbatim, so
/// malformed input yields a malformed key rather than an error.
pub fn build_version_key(
    study_id: impl fmt::Display,
    folder_id: impl fmt::Display,
    document_id: impl fmt::Display,
    version_number: impl fmt::Display,
    version_id: impl fmt::Display,
    file_extension: impl fmt::Display,
) -> String {
    format!(
        "{ROOT_PREFIX}/{study_id}/{folder_id}/{document_id}/v{version_number}/{version_id}.{file_extension}"
    )
}

/// Lowercase extension of `file_name`, or [`DEFAULT_EXTENSION`].
///
/// Only the final path segment is considered, and an extension must be
/// non-empty ASCII alphanumeric.
pub fn extension_of(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);

    match base.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

/// The components of a version key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionKey {
    /// Study segment.
    pub study_id: String,
    /// Folder segment.
    pub folder_id: String,
    /// Document segment.
    pub document_id: String,
    /// Version number, the `n` in `v{n}`.
    pub version_number: i32,
    /// Version id, the object file stem.
    pub version_id: String,
    /// Object file extension.
    pub extension: String,
}

impl VersionKey {
    /// Collect key components from displayable identifiers.
    pub fn new(
        study_id: impl fmt::Display,
        folder_id: impl fmt::Display,
        document_id: impl fmt::Display,
        version_number: i32,
        version_id: impl fmt::Display,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            study_id: study_id.to_string(),
            folder_id: folder_id.to_string(),
            document_id: document_id.to_string(),
            version_number,
            version_id: version_id.to_string(),
            extension: extension.into(),
        }
    }

    /// Parse a key produced by [`build_version_key`].
    ///
    /// Returns `None` for anything that does not have exactly the six
    /// segments of a version key.
    pub fn parse(key: &str) -> Option<Self> {
        let mut segments = key.split('/');
        if segments.next()? != ROOT_PREFIX {
            return None;
        }
        let study_id = non_empty(segments.next()?)?;
        let folder_id = non_empty(segments.next()?)?;
        let document_id = non_empty(segments.next()?)?;
        let version_number = segments.next()?.strip_prefix('v')?.parse::<i32>().ok()?;
        let (version_id, extension) = segments.next()?.rsplit_once('.')?;
        if segments.next().is_some() {
            return None;
        }

        Some(Self {
            study_id: study_id.to_string(),
            folder_id: folder_id.to_string(),
            document_id: document_id.to_string(),
            version_number,
            version_id: non_empty(version_id)?.to_string(),
            extension: non_empty(extension)?.to_string(),
        })
    }
}

fn non_empty(segment: &str) -> Option<&str> {
    (!segment.is_empty()).then_some(segment)
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&build_version_key(
            &self.study_id,
            &self.folder_id,
            &self.document_id,
            self.version_number,
            &self.version_id,
            &self.extension,
        ))
    }
}
