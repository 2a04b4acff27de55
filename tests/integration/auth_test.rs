//! Integration tests for login, logout and session cookies.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use etmf_entity::user::UserRole;
use helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_login_success_sets_cookie() {
    let app = TestApp::new().await;
    app.create_test_user("cra@example.org", UserRole::Contributor)
        .await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "cra@example.org", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["email"], "cra@example.org");
    assert!(response.body["user"].get("password_hash").is_none());
    assert!(response.body["session_id"].is_string());

    let set_cookie = response.set_cookie("auth-token").expect("No session cookie");
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new().await;
    app.create_test_user("cra@example.org", UserRole::Viewer).await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "cra@example.org", "password": "not-the-password" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.set_cookie("auth-token").is_none());
}

#[tokio::test]
async fn test_login_malformed_body() {
    let app = TestApp::new().await;

    let response = app
        .send("POST", "/api/auth/login", "application/json", b"{oops".to_vec(), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_me_requires_session() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/auth/me", None, Some("auth-token=forged"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_current_user() {
    let app = TestApp::new().await;
    let user_id = app
        .create_test_user("manager@example.org", UserRole::Manager)
        .await;
    let cookie = app.login("manager@example.org", PASSWORD).await;

    let response = app.request("GET", "/api/auth/me", None, Some(&cookie)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], user_id.to_string());
    assert_eq!(response.body["role"], "manager");
}

#[tokio::test]
async fn test_logout_clears_cookie_and_session() {
    let app = TestApp::new().await;
    let cookie = app.signed_in(UserRole::Viewer).await;

    let response = app
        .request("POST", "/api/auth/logout", None, Some(&cookie))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({ "success": true, "message": "Logged out successfully" })
    );
    let removal = response.set_cookie("auth-token").expect("No removal cookie");
    assert!(removal.contains("Max-Age=0"));

    let response = app.request("GET", "/api/auth/me", None, Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_session_succeeds() {
    let app = TestApp::new().await;

    let response = app.request("POST", "/api/auth/logout", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert!(response.set_cookie("auth-token").is_some());
}

#[tokio::test]
async fn test_inactive_user_cannot_login() {
    let app = TestApp::new().await;
    let user_id = app
        .create_test_user("gone@example.org", UserRole::Viewer)
        .await;

    let mut user = app
        .state
        .store
        .find::<etmf_entity::user::User>(user_id)
        .await
        .unwrap()
        .unwrap();
    user.is_active = false;
    app.state.store.update(&user).await.unwrap();

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "gone@example.org", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
