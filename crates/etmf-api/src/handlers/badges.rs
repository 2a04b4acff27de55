//! Status badge handler.

use axum::Json;
use axum::extract::Path;

use etmf_service::StatusBadge;

use crate::dto::response::BadgeResponse;
use crate::extractors::AuthUser;

/// GET /api/badges/{status}
pub async fn get_badge(_auth: AuthUser, Path(status): Path<String>) -> Json<BadgeResponse> {
    let badge = StatusBadge::resolve(&status);
    Json(BadgeResponse {
        status,
        label: badge.label,
        color: badge.color,
        html: badge.render_html(),
    })
}
