//! Shared test helpers for integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use chrono::Utc;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use etmf_api::AppState;
use etmf_auth::PasswordHasher;
use etmf_core::config::{AppConfig, DatabaseProvider};
use etmf_database::TableStore;
use etmf_entity::user::{User, UserRole};
use etmf_storage::StorageManager;

/// Password given to every test user.
pub const PASSWORD: &str = "correct-horse-42";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for direct store access
    pub state: AppState,
    /// Application config
    pub config: AppConfig,
    /// Local storage root; removed on drop
    pub storage_dir: TempDir,
}

impl TestApp {
    /// Create a new test application over the in-memory table store and a
    /// temp-dir local storage provider.
    pub async fn new() -> Self {
        let storage_dir = tempfile::tempdir().expect("Failed to create storage dir");

        let mut config = AppConfig::from_toml_str("").expect("Failed to build test config");
        config.database.provider = DatabaseProvider::Memory;
        config.storage.provider = "local".to_string();
        config.storage.local.root_path = storage_dir.path().to_string_lossy().into_owned();
        config.storage.max_upload_size_bytes = 64 * 1024;
        config.auth.jwt_secret = "integration-test-secret".to_string();

        let store = TableStore::from_config(&config.database)
            .await
            .expect("Failed to open store");
        let storage = StorageManager::from_config(&config.storage)
            .await
            .expect("Failed to init storage");

        let state = AppState::new(config.clone(), store, storage);
        let router = etmf_api::build_app(state.clone());

        Self {
            router,
            state,
            config,
            storage_dir,
        }
    }

    /// Create a test user and return their ID
    pub async fn create_test_user(&self, email: &str, role: UserRole) -> Uuid {
        let hash = PasswordHasher::new()
            .hash_password(PASSWORD)
            .expect("Failed to hash password");
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            display_name: email.split('@').next().unwrap_or(email).to_string(),
            role,
            is_active: true,
            password_hash: hash,
            password: None,
            created_at: Utc::now(),
        };
        self.state
            .store
            .insert(&user)
            .await
            .expect("Failed to create test user")
            .id
    }

    /// Create a user with `role`, log in, and return the session cookie
    pub async fn signed_in(&self, role: UserRole) -> String {
        let email = format!("{}-{}@example.org", role.as_str(), Uuid::new_v4().simple());
        self.create_test_user(&email, role).await;
        self.login(&email, PASSWORD).await
    }

    /// Login and return the `name=value` session cookie
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({ "email": email, "password": password })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response
            .cookie(&self.config.auth.cookie_name)
            .expect("No session cookie in login response")
    }

    /// Make a JSON request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let body = body
            .map(|b| serde_json::to_vec(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        self.send(method, path, "application/json", body, cookie).await
    }

    /// Make a request with an arbitrary body
    pub async fn send(
        &self,
        method: &str,
        path: &str,
        content_type: &str,
        body: Vec<u8>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, content_type);

        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }

        let req = req.body(Body::from(body)).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let raw = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&raw).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            raw,
        }
    }
}

/// Builds a `multipart/form-data` body with one file part and optional
/// text parts. Returns the content type and the body.
pub fn multipart(file_name: &str, content: &[u8], fields: &[(&str, &str)]) -> (String, Vec<u8>) {
    let boundary = "etmf-test-boundary";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body, or `Null`
    pub body: Value,
    /// Raw body bytes
    pub raw: Bytes,
}

impl TestResponse {
    /// `name=value` of the `Set-Cookie` header for `name`, if any
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.set_cookie(name)
            .and_then(|c| c.split(';').next().map(str::to_string))
    }

    /// Full `Set-Cookie` header for `name`, if any
    pub fn set_cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{name}=")))
            .map(str::to_string)
    }
}
