//! Response DTOs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use etmf_entity::document::Document;
use etmf_entity::user::User;
use etmf_service::StatusBadge;

/// Acknowledgement body: `{ "success": true, "message": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Always `true` for a successful call.
    pub success: bool,
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// A successful acknowledgement.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// The signed-in user.
    pub user: User,
    /// Session identifier.
    pub session_id: Uuid,
    /// When the session ends regardless of activity.
    pub expires_at: DateTime<Utc>,
}

/// A document row with its status badge.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentWithBadge {
    /// Document columns.
    #[serde(flatten)]
    pub document: Document,
    /// Badge for `document.status`.
    pub badge: StatusBadge,
}

impl From<Document> for DocumentWithBadge {
    fn from(document: Document) -> Self {
        let badge = StatusBadge::for_status(document.status);
        Self { document, badge }
    }
}

/// A resolved badge with its markup.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeResponse {
    /// Status the badge was resolved for.
    pub status: String,
    /// Label.
    pub label: &'static str,
    /// CSS color.
    pub color: &'static str,
    /// `<span>` markup.
    pub html: String,
}

/// Health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` when every dependency is reachable, else `"degraded"`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Table store backend and reachability.
    pub database: ComponentHealth,
    /// Storage provider name → reachable.
    pub storage: HashMap<String, bool>,
}

/// Health of one dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Backend name.
    pub backend: String,
    /// Whether it answered.
    pub healthy: bool,
}
