//! Rollback, delete and version history over HTTP.

use http::StatusCode;
use serde_json::json;

use crate::helpers::{DEVELOPER, OWNER, TestApp, VIEWER};

#[tokio::test]
async fn test_rollback_to_current_version_is_conflict() {
    let app = TestApp::new().await;
    let token = app.member_token(DEVELOPER);
    let uploaded = app.upload(&token, "doc.txt", "h1", "one").await;
    let file_id = uploaded["fileId"].as_i64().unwrap();

    let response = app
        .request(
            "POST",
            &format!("/api/files/{file_id}/rollback"),
            Some(json!({ "versionNumber": 1 })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_rollback_moves_pointer() {
    let app = TestApp::new().await;
    let token = app.member_token(DEVELOPER);
    let first = app.upload(&token, "doc.txt", "h1", "one").await;
    app.upload(&token, "doc.txt", "h2", "two").await;
    let file_id = first["fileId"].as_i64().unwrap();

    let response = app
        .request(
            "POST",
            &format!("/api/files/{file_id}/rollback"),
            Some(json!({ "versionNumber": 1 })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["data"]["currentVersionNumber"], 1);
    assert_eq!(response.body["data"]["currentVersionId"], first["versionId"]);

    let content = app
        .get_raw(&format!("/api/files/{file_id}/content"), &token)
        .await;
    assert_eq!(&content.body[..], b"one");
}

#[tokio::test]
async fn test_rollback_rejects_bad_input() {
    let app = TestApp::new().await;
    let token = app.member_token(DEVELOPER);
    let uploaded = app.upload(&token, "doc.txt", "h1", "one").await;
    let file_id = uploaded["fileId"].as_i64().unwrap();

    let zero = app
        .request(
            "POST",
            &format!("/api/files/{file_id}/rollback"),
            Some(json!({ "versionNumber": 0 })),
            Some(&token),
        )
        .await;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);

    let missing = app
        .request(
            "POST",
            &format!("/api/files/{file_id}/rollback"),
            Some(json!({ "versionNumber": 7 })),
            Some(&token),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_viewer_cannot_roll_back_or_delete() {
    let app = TestApp::new().await;
    let developer = app.member_token(DEVELOPER);
    let first = app.upload(&developer, "doc.txt", "h1", "one").await;
    app.upload(&developer, "doc.txt", "h2", "two").await;
    let file_id = first["fileId"].as_i64().unwrap();
    let viewer = app.member_token(VIEWER);

    let rollback = app
        .request(
            "POST",
            &format!("/api/files/{file_id}/rollback"),
            Some(json!({ "versionNumber": 1 })),
            Some(&viewer),
        )
        .await;
    assert_eq!(rollback.status, StatusCode::FORBIDDEN);

    let delete = app
        .request("DELETE", &format!("/api/files/{file_id}"), None, Some(&viewer))
        .await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);

    let developer_delete = app
        .request("DELETE", &format!("/api/files/{file_id}"), None, Some(&developer))
        .await;
    assert_eq!(developer_delete.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_owner_delete_removes_objects_and_rows() {
    let app = TestApp::new().await;
    let owner = app.member_token(OWNER);
    let first = app.upload(&owner, "doc.txt", "h1", "one").await;
    app.upload(&owner, "doc.txt", "h2", "two").await;
    let file_id = first["fileId"].as_i64().unwrap();
    assert_eq!(app.store.as_ref().unwrap().len(), 2);

    let response = app
        .request("DELETE", &format!("/api/files/{file_id}"), None, Some(&owner))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["data"]["versionsRemoved"], 2);
    assert_eq!(response.body["data"]["objectsFailed"], 0);
    assert!(app.store.as_ref().unwrap().is_empty());

    let download = app
        .request("GET", &format!("/api/files/{file_id}/download"), None, Some(&owner))
        .await;
    assert_eq!(download.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_version_listing_is_newest_first_and_paged() {
    let app = TestApp::new().await;
    let token = app.member_token(DEVELOPER);
    let first = app.upload(&token, "doc.txt", "h1", "one").await;
    app.upload(&token, "doc.txt", "h2", "two").await;
    app.upload(&token, "doc.txt", "h3", "three").await;
    let file_id = first["fileId"].as_i64().unwrap();

    let response = app
        .request(
            "GET",
            &format!("/api/files/{file_id}/versions?page=1&pageSize=2"),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let data = &response.body["data"];
    assert_eq!(data["total"], 3);
    assert_eq!(data["totalPages"], 2);
    let numbers: Vec<i64> = data["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["versionNumber"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![3, 2]);
}

#[tokio::test]
async fn test_version_listing_with_huge_page_is_empty() {
    let app = TestApp::new().await;
    let token = app.member_token(DEVELOPER);
    let first = app.upload(&token, "doc.txt", "h1", "one").await;
    let file_id = first["fileId"].as_i64().unwrap();

    let response = app
        .request(
            "GET",
            &format!("/api/files/{file_id}/versions?page={}&pageSize=100", u64::MAX),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let data = &response.body["data"];
    assert_eq!(data["total"], 1);
    assert!(data["items"].as_array().unwrap().is_empty());
}
