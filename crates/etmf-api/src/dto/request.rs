//! Request DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// E-mail address.
    #[validate(length(min = 1, max = 320))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1))]
    pub password: String,
}

/// `?id=` query accepted by the delete routes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordQuery {
    /// Record identifier.
    pub id: Option<String>,
}
