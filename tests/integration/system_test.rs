//! Health, project listing and the end-to-end scenario.

use http::StatusCode;
use serde_json::json;

use crate::helpers::{OUTSIDER, OWNER, PROJECT, TestApp};

#[tokio::test]
async fn test_health_reports_components() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["database"], "memory");
    assert_eq!(response.body["data"]["storage"], "configured");
    assert_eq!(response.body["data"]["storageProvider"], "memory");
}

#[tokio::test]
async fn test_health_is_degraded_without_storage() {
    let app = TestApp::without_storage().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "degraded");
    assert_eq!(response.body["data"]["storage"], "not_configured");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = TestApp::new().await;

    let response = app.get_raw("/api/health", "unused").await;

    assert!(response.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_project_listing_is_member_only() {
    let app = TestApp::new().await;
    let owner = app.member_token(OWNER);
    app.upload(&owner, "a.txt", "h1", "a").await;
    app.upload(&owner, "b.txt", "h2", "b").await;

    let listing = app
        .request("GET", &format!("/api/projects/{PROJECT}/files"), None, Some(&owner))
        .await;
    assert_eq!(listing.status, StatusCode::OK, "{}", listing.body);
    assert_eq!(listing.body["data"]["total"], 2);
    let first = &listing.body["data"]["items"][0];
    assert_eq!(first["file"]["name"], "b.txt");
    assert_eq!(first["version"]["versionNumber"], 1);

    let outsider = app.member_token(OUTSIDER);
    let denied = app
        .request(
            "GET",
            &format!("/api/projects/{PROJECT}/files"),
            None,
            Some(&outsider),
        )
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let app = TestApp::new().await;
    let owner = app.member_token(OWNER);

    let v1 = app.upload(&owner, "doc.txt", "h1", "first").await;
    assert_eq!(v1["versionNumber"], 1);
    let file_id = v1["fileId"].as_i64().unwrap();

    let v2 = app.upload(&owner, "doc.txt", "h2", "second").await;
    assert_eq!(v2["versionNumber"], 2);
    assert_eq!(v2["fileId"], v1["fileId"]);

    let rollback = app
        .request(
            "POST",
            &format!("/api/files/{file_id}/rollback"),
            Some(json!({ "versionNumber": 1 })),
            Some(&owner),
        )
        .await;
    assert_eq!(rollback.status, StatusCode::OK);

    let versions = app
        .request("GET", &format!("/api/files/{file_id}/versions"), None, Some(&owner))
        .await;
    assert_eq!(versions.body["data"]["total"], 2);

    let current = app
        .request("GET", &format!("/api/files/{file_id}/download"), None, Some(&owner))
        .await;
    assert_eq!(current.body["data"]["versionId"], v1["versionId"]);

    let deleted = app
        .request("DELETE", &format!("/api/files/{file_id}"), None, Some(&owner))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = app
        .request("GET", &format!("/api/files/{file_id}/download"), None, Some(&owner))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    // The name is free again once the file is deleted.
    let reused = app.upload(&owner, "doc.txt", "h3", "third").await;
    assert_eq!(reused["versionNumber"], 1);
    assert_ne!(reused["fileId"], v1["fileId"]);
}
