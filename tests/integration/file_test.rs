//! Upload handshake, upload-through and retrieval over HTTP.

use http::StatusCode;
use serde_json::json;

use crate::helpers::{DEVELOPER, OUTSIDER, PLATFORM_ADMIN, PROJECT, TestApp, VIEWER};

#[tokio::test]
async fn test_pre_upload_returns_signed_url() {
    let app = TestApp::new().await;
    let token = app.member_token(DEVELOPER);

    let response = app.pre_upload(&token, "doc.txt", "h1").await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["success"], true);
    let data = &response.body["data"];
    assert_eq!(data["versionNumber"], 1);
    assert_eq!(data["contentType"], "text/plain");
    assert!(data["fileId"].as_i64().unwrap() > 0);
    assert!(data["versionId"].as_i64().unwrap() > 0);
    assert!(
        data["uploadUrl"]
            .as_str()
            .unwrap()
            .contains("/assets/")
    );
    assert!(data["expiresAt"].is_string());
}

#[tokio::test]
async fn test_pre_upload_unauthenticated() {
    let app = TestApp::new().await;

    let response = app
        .request("POST", "/api/files/pre-upload", Some(json!({})), None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request("GET", "/api/files/1/versions", None, Some("not-a-jwt"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_pre_upload_by_outsider_is_forbidden() {
    let app = TestApp::new().await;
    let token = app.member_token(OUTSIDER);

    let response = app.pre_upload(&token, "doc.txt", "h1").await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.body.get("data").is_none());
    assert_eq!(app.store.as_ref().unwrap().len(), 0);
}

#[tokio::test]
async fn test_pre_upload_validation() {
    let app = TestApp::new().await;
    let token = app.member_token(DEVELOPER);

    let missing_format = app
        .request(
            "POST",
            "/api/files/pre-upload",
            Some(json!({
                "projectId": PROJECT,
                "name": "doc.txt",
                "fileCategory": "text",
                "fileFormat": "",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(missing_format.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_format.body["error"], "VALIDATION_ERROR");

    let not_json = app
        .request(
            "POST",
            "/api/files/pre-upload",
            Some(json!(["not", "an", "object"])),
            Some(&token),
        )
        .await;
    assert_eq!(not_json.status, StatusCode::BAD_REQUEST);

    let member_scope_zero = app
        .request(
            "POST",
            "/api/files/pre-upload",
            Some(json!({
                "projectId": 0,
                "name": "doc.txt",
                "fileCategory": "text",
                "fileFormat": "txt",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(member_scope_zero.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_privileged_caller_may_upload_without_project() {
    let app = TestApp::new().await;
    let token = app.admin_token(PLATFORM_ADMIN);

    let response = app
        .request(
            "POST",
            "/api/files/pre-upload",
            Some(json!({
                "projectId": 0,
                "name": "global.png",
                "fileCategory": "image",
                "fileFormat": "png",
                "sizeBytes": 4,
                "hash": "abcdef0123",
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["data"]["contentType"], "image/png");
}

#[tokio::test]
async fn test_pre_upload_without_storage_fails() {
    let app = TestApp::without_storage().await;
    let token = app.member_token(DEVELOPER);

    let response = app.pre_upload(&token, "doc.txt", "h1").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "STORAGE_NOT_CONFIGURED");
}

#[tokio::test]
async fn test_upload_through_then_stream_content() {
    let app = TestApp::new().await;
    let token = app.member_token(DEVELOPER);

    let uploaded = app
        .multipart(
            &token,
            &[
                ("projectId", None, None, "1"),
                ("file", Some("notes.txt"), Some("text/markdown"), "hello world"),
            ],
        )
        .await;
    assert_eq!(uploaded.status, StatusCode::OK, "{}", uploaded.body);
    let data = &uploaded.body["data"];
    assert_eq!(data["versionNumber"], 1);
    assert_eq!(data["contentType"], "text/markdown");
    let file_id = data["fileId"].as_i64().unwrap();

    let content = app
        .get_raw(&format!("/api/files/{file_id}/content"), &token)
        .await;
    assert_eq!(content.status, StatusCode::OK);
    assert_eq!(&content.body[..], b"hello world");
    assert_eq!(content.headers["content-type"], "text/plain");
    assert_eq!(content.headers["cache-control"], "private, max-age=3600");
}

#[tokio::test]
async fn test_upload_through_form_content_type_wins() {
    let app = TestApp::new().await;
    let token = app.member_token(DEVELOPER);

    let uploaded = app
        .multipart(
            &token,
            &[
                ("projectId", None, None, "1"),
                ("contentType", None, None, "application/x-custom"),
                ("file", Some("data.bin"), Some("application/octet-stream"), "0101"),
            ],
        )
        .await;

    assert_eq!(uploaded.status, StatusCode::OK, "{}", uploaded.body);
    assert_eq!(uploaded.body["data"]["contentType"], "application/x-custom");
}

#[tokio::test]
async fn test_upload_through_requires_file_and_project() {
    let app = TestApp::new().await;
    let token = app.member_token(DEVELOPER);

    let no_file = app.multipart(&token, &[("projectId", None, None, "1")]).await;
    assert_eq!(no_file.status, StatusCode::BAD_REQUEST);

    let no_project = app
        .multipart(&token, &[("file", Some("a.txt"), None, "abc")])
        .await;
    assert_eq!(no_project.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_link_points_at_selected_version() {
    let app = TestApp::new().await;
    let token = app.member_token(DEVELOPER);
    let first = app.upload(&token, "doc.txt", "h1", "one").await;
    let second = app.upload(&token, "doc.txt", "h2", "two").await;
    let file_id = first["fileId"].as_i64().unwrap();

    let current = app
        .request("GET", &format!("/api/files/{file_id}/download"), None, Some(&token))
        .await;
    assert_eq!(current.status, StatusCode::OK);
    assert_eq!(current.body["data"]["versionNumber"], 2);
    assert_eq!(current.body["data"]["versionId"], second["versionId"]);
    assert!(current.body["data"]["url"].as_str().unwrap().contains("method=GET"));

    let pinned = app
        .request(
            "GET",
            &format!("/api/files/{file_id}/download?versionNumber=1"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(pinned.status, StatusCode::OK);
    assert_eq!(pinned.body["data"]["versionId"], first["versionId"]);
}

#[tokio::test]
async fn test_viewer_can_read_but_outsider_cannot() {
    let app = TestApp::new().await;
    let uploaded = app
        .upload(&app.member_token(DEVELOPER), "doc.txt", "h1", "hello")
        .await;
    let file_id = uploaded["fileId"].as_i64().unwrap();

    let viewer = app.member_token(VIEWER);
    let download = app
        .request("GET", &format!("/api/files/{file_id}/download"), None, Some(&viewer))
        .await;
    assert_eq!(download.status, StatusCode::OK);

    let outsider = app.member_token(OUTSIDER);
    let denied = app
        .request("GET", &format!("/api/files/{file_id}/download"), None, Some(&outsider))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert!(denied.body.get("data").is_none());

    let stream = app
        .get_raw(&format!("/api/files/{file_id}/content"), &outsider)
        .await;
    assert_eq!(stream.status, StatusCode::FORBIDDEN);
    assert!(!stream.body.starts_with(b"hello"));
}

#[tokio::test]
async fn test_content_for_never_uploaded_version_is_not_found() {
    let app = TestApp::new().await;
    let token = app.member_token(DEVELOPER);
    let response = app.pre_upload(&token, "ghost.txt", "h1").await;
    let file_id = response.body["data"]["fileId"].as_i64().unwrap();

    let content = app
        .get_raw(&format!("/api/files/{file_id}/content"), &token)
        .await;

    assert_eq!(content.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_file_id_is_bad_request() {
    let app = TestApp::new().await;
    let token = app.member_token(DEVELOPER);

    let response = app
        .request("GET", "/api/files/abc/download", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
