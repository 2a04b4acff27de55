//! Integration tests for document versioning over HTTP.

mod helpers;

use axum::http::{StatusCode, header};
use serde_json::{Value, json};

use etmf_entity::user::UserRole;
use helpers::{TestApp, TestResponse, multipart};

struct Fixture {
    app: TestApp,
    cookie: String,
    document: Value,
}

async fn setup() -> Fixture {
    let app = TestApp::new().await;
    let cookie = app.signed_in(UserRole::Contributor).await;

    let study = app
        .request(
            "POST",
            "/api/studies",
            Some(json!({ "protocol_number": "ETMF-100", "title": "Versioning" })),
            Some(&cookie),
        )
        .await
        .body;
    let folder = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({
                "study_id": study["id"],
                "name": "01 Trial Management",
                "level": "trial"
            })),
            Some(&cookie),
        )
        .await
        .body;
    let created = app
        .request(
            "POST",
            "/api/documents",
            Some(json!({
                "study_id": study["id"],
                "folder_id": folder["id"],
                "zone": "01",
                "artifact": "01.01.01"
            })),
            Some(&cookie),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);

    Fixture {
        app,
        cookie,
        document: created.body,
    }
}

impl Fixture {
    fn document_id(&self) -> &str {
        self.document["id"].as_str().unwrap()
    }

    async fn upload(&self, file_name: &str, content: &[u8], fields: &[(&str, &str)]) -> TestResponse {
        let (content_type, body) = multipart(file_name, content, fields);
        self.app
            .send(
                "POST",
                &format!("/api/documents/{}/versions", self.document_id()),
                &content_type,
                body,
                Some(&self.cookie),
            )
            .await
    }
}

#[tokio::test]
async fn test_document_created_as_draft_by_caller() {
    let fx = setup().await;

    assert_eq!(fx.document["status"], "draft");
    assert!(fx.document["current_version_id"].is_null());
    assert_eq!(fx.document["is_deleted"], false);

    let me = fx
        .app
        .request("GET", "/api/auth/me", None, Some(&fx.cookie))
        .await;
    assert_eq!(fx.document["created_by"], me.body["id"]);
}

#[tokio::test]
async fn test_upload_assigns_sequential_versions() {
    let fx = setup().await;

    let v1 = fx
        .upload("Protocol.PDF", b"first", &[("document_name", "Protocol")])
        .await;
    assert_eq!(v1.status, StatusCode::CREATED, "{:?}", v1.body);
    assert_eq!(v1.body["document_version"], 1);
    assert_eq!(v1.body["document_name"], "Protocol");
    assert_eq!(v1.body["file_size"], 5);

    let expected_key = format!(
        "documents/{}/{}/{}/v1/{}.pdf",
        fx.document["study_id"].as_str().unwrap(),
        fx.document["folder_id"].as_str().unwrap(),
        fx.document_id(),
        v1.body["id"].as_str().unwrap()
    );
    assert_eq!(v1.body["file_path"], expected_key);

    let v2 = fx
        .upload("protocol-v2.pdf", b"second", &[("change_reason", "Amendment 1")])
        .await;
    assert_eq!(v2.status, StatusCode::CREATED);
    assert_eq!(v2.body["document_version"], 2);
    assert_eq!(v2.body["document_name"], "Protocol");
    assert_eq!(v2.body["change_reason"], "Amendment 1");
    assert!(v2.body["file_path"].as_str().unwrap().contains("/v2/"));

    let versions = fx
        .app
        .request(
            "GET",
            &format!("/api/documents/{}/versions", fx.document_id()),
            None,
            Some(&fx.cookie),
        )
        .await;
    assert_eq!(versions.status, StatusCode::OK);
    let numbers: Vec<i64> = versions
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["document_version"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![1, 2]);

    let documents = fx
        .app
        .request("GET", "/api/documents", None, Some(&fx.cookie))
        .await;
    assert_eq!(documents.body[0]["current_version_id"], v2.body["id"]);
}

#[tokio::test]
async fn test_download_returns_uploaded_bytes() {
    let fx = setup().await;
    fx.upload("site-list.csv", b"site,country\n101,DE\n", &[])
        .await;

    let response = fx
        .app
        .send(
            "GET",
            &format!("/api/documents/{}/versions/1/download", fx.document_id()),
            "application/json",
            Vec::new(),
            Some(&fx.cookie),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.raw[..], b"site,country\n101,DE\n");
    let disposition = response.headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap();
    assert!(disposition.contains("site-list.csv"));

    let missing = fx
        .app
        .request(
            "GET",
            &format!("/api/documents/{}/versions/9/download", fx.document_id()),
            None,
            Some(&fx.cookie),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_rejections() {
    let fx = setup().await;

    let empty = fx.upload("empty.pdf", b"", &[]).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let too_big = fx.upload("big.pdf", &vec![b'x'; 70 * 1024], &[]).await;
    assert_eq!(too_big.status, StatusCode::BAD_REQUEST);

    let viewer = fx.app.signed_in(UserRole::Viewer).await;
    let (content_type, body) = multipart("a.pdf", b"data", &[]);
    let forbidden = fx
        .app
        .send(
            "POST",
            &format!("/api/documents/{}/versions", fx.document_id()),
            &content_type,
            body,
            Some(&viewer),
        )
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_archived_document_rejects_uploads() {
    let fx = setup().await;
    fx.upload("a.pdf", b"data", &[]).await;

    let archived = fx
        .app
        .request(
            "POST",
            &format!("/api/documents/{}/archive", fx.document_id()),
            None,
            Some(&fx.cookie),
        )
        .await;
    assert_eq!(archived.status, StatusCode::OK);
    assert_eq!(archived.body["status"], "archived");

    let rejected = fx.upload("b.pdf", b"more", &[]).await;
    assert_eq!(rejected.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_current_version_must_belong_to_document() {
    let fx = setup().await;

    let mut update = fx.document.clone();
    update["current_version_id"] = json!(uuid::Uuid::new_v4());
    let response = fx
        .app
        .request("POST", "/api/documents", Some(update), Some(&fx.cookie))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_hides_document() {
    let fx = setup().await;

    let listed = fx
        .app
        .request("GET", "/api/documents", None, Some(&fx.cookie))
        .await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);
    assert_eq!(listed.body[0]["badge"]["label"], "Draft");
    assert_eq!(listed.body[0]["badge"]["color"], "#6b7280");

    let deleted = fx
        .app
        .request(
            "DELETE",
            &format!("/api/documents/{}", fx.document_id()),
            None,
            Some(&fx.cookie),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Document deleted");

    let listed = fx
        .app
        .request("GET", "/api/documents", None, Some(&fx.cookie))
        .await;
    assert_eq!(listed.body, json!([]));

    let upload = fx.upload("late.pdf", b"late", &[]).await;
    assert_eq!(upload.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_update_keeps_current_version() {
    let fx = setup().await;
    let v1 = fx.upload("plan.pdf", b"plan", &[]).await;
    assert_eq!(v1.status, StatusCode::CREATED);

    let response = fx
        .app
        .request(
            "POST",
            "/api/documents",
            Some(json!({
                "id": fx.document["id"],
                "study_id": fx.document["study_id"],
                "folder_id": fx.document["folder_id"],
                "status": "on_review"
            })),
            Some(&fx.cookie),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["status"], "on_review");
    assert_eq!(response.body["current_version_id"], v1.body["id"]);
}

#[tokio::test]
async fn test_deleted_document_stays_deleted() {
    let fx = setup().await;

    let deleted = fx
        .app
        .request(
            "DELETE",
            &format!("/api/documents/{}", fx.document_id()),
            None,
            Some(&fx.cookie),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let repost = fx
        .app
        .request("POST", "/api/documents", Some(fx.document.clone()), Some(&fx.cookie))
        .await;
    assert_eq!(repost.status, StatusCode::NOT_FOUND);

    let mut marked = fx.document.clone();
    marked["status"] = json!("deleted");
    marked["id"] = json!(uuid::Uuid::new_v4());
    let response = fx
        .app
        .request("POST", "/api/documents", Some(marked), Some(&fx.cookie))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let listed = fx
        .app
        .request("GET", "/api/documents", None, Some(&fx.cookie))
        .await;
    assert_eq!(listed.body, json!([]));
}
