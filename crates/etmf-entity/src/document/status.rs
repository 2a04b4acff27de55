//! Document lifecycle status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use etmf_core::error::AppError;

/// Lifecycle status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Newly created, still being edited.
    #[default]
    Draft,
    /// Submitted for QC review.
    OnReview,
    /// Approved and filed.
    Approved,
    /// Rejected at review.
    Rejected,
    /// Archived; read-only.
    Archived,
    /// Soft-deleted; hidden from listings.
    Deleted,
}

impl DocumentStatus {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::OnReview => "on_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Archived => "archived",
            Self::Deleted => "deleted",
        }
    }

    /// Whether new versions may be uploaded.
    pub fn accepts_uploads(&self) -> bool {
        !matches!(self, Self::Archived | Self::Deleted)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "on_review" => Ok(Self::OnReview),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "archived" => Ok(Self::Archived),
            "deleted" => Ok(Self::Deleted),
            _ => Err(AppError::validation(format!("Invalid document status: '{s}'"))),
        }
    }
}
