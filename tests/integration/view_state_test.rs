//! Integration tests for per-session view state and status badges.

mod helpers;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use etmf_entity::session::Session;
use etmf_entity::user::UserRole;
use helpers::TestApp;

#[tokio::test]
async fn test_navigation_starts_empty() {
    let app = TestApp::new().await;
    let cookie = app.signed_in(UserRole::Viewer).await;

    let response = app
        .request("GET", "/api/view-state/navigation", None, Some(&cookie))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({
            "isModal": false,
            "currentProject": null,
            "currentCountry": null,
            "currentSite": null,
            "selectedFolder": null,
            "currentLevel": null
        })
    );
}

#[tokio::test]
async fn test_navigation_patch_merges_and_clears() {
    let app = TestApp::new().await;
    let cookie = app.signed_in(UserRole::Viewer).await;

    let patched = app
        .request(
            "PATCH",
            "/api/view-state/navigation",
            Some(json!({ "currentProject": "ETMF-001", "currentLevel": "site", "currentSite": "101" })),
            Some(&cookie),
        )
        .await;
    assert_eq!(patched.status, StatusCode::OK);
    assert_eq!(patched.body["currentProject"], "ETMF-001");
    assert_eq!(patched.body["currentLevel"], "site");

    let patched = app
        .request(
            "PATCH",
            "/api/view-state/navigation",
            Some(json!({ "currentSite": null, "isModal": true })),
            Some(&cookie),
        )
        .await;
    assert_eq!(patched.body["currentProject"], "ETMF-001");
    assert!(patched.body["currentSite"].is_null());
    assert_eq!(patched.body["isModal"], true);

    let fetched = app
        .request("GET", "/api/view-state/navigation", None, Some(&cookie))
        .await;
    assert_eq!(fetched.body, patched.body);

    let reset = app
        .request("DELETE", "/api/view-state/navigation", None, Some(&cookie))
        .await;
    assert_eq!(reset.status, StatusCode::OK);
    assert!(reset.body["currentProject"].is_null());
    assert_eq!(reset.body["isModal"], false);
}

#[tokio::test]
async fn test_navigation_rejects_bad_patch() {
    let app = TestApp::new().await;
    let cookie = app.signed_in(UserRole::Viewer).await;

    let response = app
        .request(
            "PATCH",
            "/api/view-state/navigation",
            Some(json!({ "currentLevel": "planet" })),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_view_state_is_per_session() {
    let app = TestApp::new().await;
    let first = app.signed_in(UserRole::Viewer).await;
    let second = app.signed_in(UserRole::Viewer).await;

    app.request(
        "PATCH",
        "/api/view-state/navigation",
        Some(json!({ "selectedFolder": "01.01" })),
        Some(&first),
    )
    .await;

    let other = app
        .request("GET", "/api/view-state", None, Some(&second))
        .await;
    assert!(other.body["navigation"]["selectedFolder"].is_null());

    let own = app.request("GET", "/api/view-state", None, Some(&first)).await;
    assert_eq!(own.body["navigation"]["selectedFolder"], "01.01");
    assert_eq!(own.body["studies"]["studies"], json!([]));
}

#[tokio::test]
async fn test_view_state_dropped_on_logout() {
    let app = TestApp::new().await;
    let cookie = app.signed_in(UserRole::Viewer).await;

    app.request(
        "PATCH",
        "/api/view-state/navigation",
        Some(json!({ "isModal": true })),
        Some(&cookie),
    )
    .await;
    assert_eq!(app.state.view_states.len(), 1);

    app.request("POST", "/api/auth/logout", None, Some(&cookie))
        .await;
    assert!(app.state.view_states.is_empty());
}

#[tokio::test]
async fn test_view_state_dropped_with_expired_session() {
    let app = TestApp::new().await;
    let cookie = app.signed_in(UserRole::Viewer).await;

    app.request(
        "PATCH",
        "/api/view-state/navigation",
        Some(json!({ "isModal": true })),
        Some(&cookie),
    )
    .await;
    assert_eq!(app.state.view_states.len(), 1);

    let mut sessions = app.state.store.list::<Session>().await.unwrap();
    assert_eq!(sessions.len(), 1);
    let mut session = sessions.remove(0);
    session.expires_at = Utc::now() - Duration::minutes(1);
    app.state.store.update(&session).await.unwrap();

    let removed = app.state.session_cleanup().run_once().await.unwrap();
    assert_eq!(removed, 1);
    assert!(app.state.view_states.is_empty());
}

#[tokio::test]
async fn test_studies_save_then_load() {
    let app = TestApp::new().await;
    let cookie = app.signed_in(UserRole::Contributor).await;

    let saved = app
        .request(
            "POST",
            "/api/view-state/studies/save",
            Some(json!({ "protocol_number": "ETMF-200", "title": "Oncology" })),
            Some(&cookie),
        )
        .await;
    assert_eq!(saved.status, StatusCode::OK, "{:?}", saved.body);
    assert_eq!(saved.body["study"]["protocol_number"], "ETMF-200");
    assert_eq!(saved.body["state"]["studies"].as_array().unwrap().len(), 1);

    let mut renamed = saved.body["study"].clone();
    renamed["title"] = json!("Oncology II");
    let saved = app
        .request(
            "POST",
            "/api/view-state/studies/save",
            Some(renamed),
            Some(&cookie),
        )
        .await;
    let studies = saved.body["state"]["studies"].as_array().unwrap();
    assert_eq!(studies.len(), 1);
    assert_eq!(studies[0]["title"], "Oncology II");

    let other = app.signed_in(UserRole::Viewer).await;
    let loaded = app
        .request("POST", "/api/view-state/studies/load", None, Some(&other))
        .await;
    assert_eq!(loaded.status, StatusCode::OK);
    assert_eq!(loaded.body["isLoading"], false);
    assert!(loaded.body["error"].is_null());
    assert_eq!(loaded.body["studies"][0]["title"], "Oncology II");

    let cached = app
        .request("GET", "/api/view-state/studies", None, Some(&other))
        .await;
    assert_eq!(cached.body, loaded.body);
}

#[tokio::test]
async fn test_viewer_cannot_save_study() {
    let app = TestApp::new().await;
    let cookie = app.signed_in(UserRole::Viewer).await;

    let response = app
        .request(
            "POST",
            "/api/view-state/studies/save",
            Some(json!({ "protocol_number": "ETMF-300", "title": "Nope" })),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_badges() {
    let app = TestApp::new().await;
    let cookie = app.signed_in(UserRole::Viewer).await;

    let approved = app
        .request("GET", "/api/badges/approved", None, Some(&cookie))
        .await;
    assert_eq!(approved.status, StatusCode::OK);
    assert_eq!(approved.body["label"], "Approved");
    assert_eq!(approved.body["color"], "#10b981");
    assert!(approved.body["html"].as_str().unwrap().contains(">Approved</span>"));

    let unknown = app
        .request("GET", "/api/badges/shredded", None, Some(&cookie))
        .await;
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(unknown.body["label"], "UNKNOWN");
    assert_eq!(unknown.body["color"], "#9ca3af");

    let anonymous = app.request("GET", "/api/badges/approved", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}
