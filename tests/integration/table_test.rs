//! Integration tests for the fixed resource routes and `/api/tables/{table}`.

mod helpers;

use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use etmf_entity::user::UserRole;
use helpers::TestApp;

async fn create_study(app: &TestApp, cookie: &str) -> Value {
    let response = app
        .request(
            "POST",
            "/api/studies",
            Some(json!({ "protocol_number": "ETMF-001", "title": "Phase II trial" })),
            Some(cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.body
}

#[tokio::test]
async fn test_site_create_then_update() {
    let app = TestApp::new().await;
    let cookie = app.signed_in(UserRole::Contributor).await;
    let study = create_study(&app, &cookie).await;

    let site = json!({
        "study_id": study["id"],
        "site_number": "101",
        "name": "General Hospital",
        "country": "DE"
    });
    let created = app
        .request("POST", "/api/site", Some(site), Some(&cookie))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["id"].as_str().unwrap().to_string();
    assert_ne!(id, Uuid::nil().to_string());

    let mut update = created.body.clone();
    update["name"] = json!("University Hospital");
    let updated = app
        .request("POST", "/api/site", Some(update), Some(&cookie))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["id"], id);
    assert_eq!(updated.body["name"], "University Hospital");
    assert_eq!(updated.body["created_at"], created.body["created_at"]);

    let listed = app.request("GET", "/api/site", None, Some(&cookie)).await;
    assert_eq!(listed.status, StatusCode::OK);
    let rows = listed.body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "University Hospital");
}

#[tokio::test]
async fn test_unknown_id_is_inserted_under_that_id() {
    let app = TestApp::new().await;
    let cookie = app.signed_in(UserRole::Contributor).await;
    let id = Uuid::new_v4();

    let response = app
        .request(
            "POST",
            "/api/studies",
            Some(json!({
                "id": id,
                "protocol_number": "ETMF-002",
                "title": "Imported"
            })),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["id"], id.to_string());
}

#[tokio::test]
async fn test_delete_by_query_and_body() {
    let app = TestApp::new().await;
    let cookie = app.signed_in(UserRole::Contributor).await;
    let first = create_study(&app, &cookie).await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/studies?id={}", first["id"].as_str().unwrap()),
            None,
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Record deleted");

    let second = create_study(&app, &cookie).await;
    let response = app
        .request(
            "DELETE",
            "/api/tables/studies",
            Some(json!({ "id": second["id"] })),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let listed = app.request("GET", "/api/studies", None, Some(&cookie)).await;
    assert_eq!(listed.body, json!([]));
}

#[tokio::test]
async fn test_delete_errors() {
    let app = TestApp::new().await;
    let cookie = app.signed_in(UserRole::Contributor).await;

    let missing = app
        .request(
            "DELETE",
            &format!("/api/folders?id={}", Uuid::new_v4()),
            None,
            Some(&cookie),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let no_id = app
        .request("DELETE", "/api/folders", None, Some(&cookie))
        .await;
    assert_eq!(no_id.status, StatusCode::BAD_REQUEST);

    let not_allowed = app
        .request(
            "DELETE",
            &format!("/api/tables/documents?id={}", Uuid::new_v4()),
            None,
            Some(&cookie),
        )
        .await;
    assert_eq!(not_allowed.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_and_internal_tables_are_rejected() {
    let app = TestApp::new().await;
    let cookie = app.signed_in(UserRole::Admin).await;

    let unknown = app
        .request("GET", "/api/tables/patients", None, Some(&cookie))
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.body["error"], "VALIDATION_ERROR");

    let sessions = app
        .request("GET", "/api/tables/sessions", None, Some(&cookie))
        .await;
    assert_eq!(sessions.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_named_route_matches_fixed_route() {
    let app = TestApp::new().await;
    let cookie = app.signed_in(UserRole::Contributor).await;
    create_study(&app, &cookie).await;

    let fixed = app.request("GET", "/api/studies", None, Some(&cookie)).await;
    let named = app
        .request("GET", "/api/tables/studies", None, Some(&cookie))
        .await;
    assert_eq!(fixed.status, StatusCode::OK);
    assert_eq!(fixed.body, named.body);
}

#[tokio::test]
async fn test_role_checks() {
    let app = TestApp::new().await;

    let anonymous = app.request("GET", "/api/studies", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let viewer = app.signed_in(UserRole::Viewer).await;
    let read = app.request("GET", "/api/studies", None, Some(&viewer)).await;
    assert_eq!(read.status, StatusCode::OK);

    let write = app
        .request(
            "POST",
            "/api/studies",
            Some(json!({ "protocol_number": "X", "title": "Y" })),
            Some(&viewer),
        )
        .await;
    assert_eq!(write.status, StatusCode::FORBIDDEN);

    let contributor = app.signed_in(UserRole::Contributor).await;
    let users = app
        .request(
            "POST",
            "/api/users",
            Some(json!({ "email": "new@example.org", "display_name": "New" })),
            Some(&contributor),
        )
        .await;
    assert_eq!(users.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = TestApp::new().await;
    let cookie = app.signed_in(UserRole::Contributor).await;

    let response = app
        .send("POST", "/api/studies", "application/json", b"[1,2".to_vec(), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_creates_user_with_password() {
    let app = TestApp::new().await;
    let admin = app.signed_in(UserRole::Admin).await;

    let created = app
        .request(
            "POST",
            "/api/users",
            Some(json!({
                "email": "qc@example.org",
                "display_name": "QC Reviewer",
                "role": "contributor",
                "password": "a-long-enough-password"
            })),
            Some(&admin),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    assert!(created.body.get("password").is_none());
    assert!(created.body.get("password_hash").is_none());

    let cookie = app.login("qc@example.org", "a-long-enough-password").await;
    let me = app.request("GET", "/api/auth/me", None, Some(&cookie)).await;
    assert_eq!(me.body["role"], "contributor");

    let mut rename = created.body.clone();
    rename["display_name"] = json!("QC Lead");
    let updated = app
        .request("POST", "/api/users", Some(rename), Some(&admin))
        .await;
    assert_eq!(updated.status, StatusCode::OK);

    // Password survives an update that does not carry one.
    app.login("qc@example.org", "a-long-enough-password").await;
}

#[tokio::test]
async fn test_short_password_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.signed_in(UserRole::Admin).await;

    let response = app
        .request(
            "POST",
            "/api/users",
            Some(json!({
                "email": "weak@example.org",
                "display_name": "Weak",
                "password": "abc"
            })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["database"]["backend"], "memory");
}
