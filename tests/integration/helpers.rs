//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use bytes::Bytes;
use http::{HeaderMap, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use assethub_api::{AppState, build_app};
use assethub_auth::{JwtEncoder, Principal};
use assethub_core::config::AppConfig;
use assethub_core::traits::storage::ObjectStore;
use assethub_core::types::{ProjectId, UserId};
use assethub_database::{MemoryCatalog, MemoryMembership};
use assethub_entity::project::ProjectRole;
use assethub_storage::StorageManager;
use assethub_storage::providers::memory::MemoryObjectStore;

pub const PROJECT: i64 = 1;
pub const OWNER: i64 = 10;
pub const DEVELOPER: i64 = 12;
pub const VIEWER: i64 = 13;
pub const OUTSIDER: i64 = 99;
pub const PLATFORM_ADMIN: i64 = 1000;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Catalog behind the router
    pub catalog: MemoryCatalog,
    /// Object store behind the router, when storage is configured
    pub store: Option<MemoryObjectStore>,
    /// Application config
    pub config: AppConfig,
    encoder: JwtEncoder,
}

/// A decoded JSON response.
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// A response whose body is kept as raw bytes.
pub struct RawResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Body bytes
    pub body: Bytes,
}

impl TestApp {
    /// App with an in-memory object store and the default project seeded.
    pub async fn new() -> Self {
        Self::build(true).await
    }

    /// App whose storage section is incomplete.
    pub async fn without_storage() -> Self {
        Self::build(false).await
    }

    async fn build(with_storage: bool) -> Self {
        let mut config = AppConfig::default();
        config.storage.provider = "memory".to_string();
        config.storage.max_upload_size_bytes = 1024 * 1024;

        let catalog = MemoryCatalog::new();
        let members = MemoryMembership::new();
        let project = ProjectId::new(PROJECT);
        members.grant(project, UserId::new(OWNER), ProjectRole::Owner).await;
        members
            .grant(project, UserId::new(DEVELOPER), ProjectRole::Developer)
            .await;
        members.grant(project, UserId::new(VIEWER), ProjectRole::Viewer).await;

        let store = with_storage.then(MemoryObjectStore::new);
        let storage = match &store {
            Some(store) => StorageManager::with_store(Arc::new(store.clone())),
            None => StorageManager::unconfigured(),
        };

        let state = AppState::new(
            config.clone(),
            Arc::new(catalog.clone()),
            Arc::new(members),
            storage,
            None,
        );

        Self {
            router: build_app(state),
            catalog,
            store,
            encoder: JwtEncoder::new(&config.auth),
            config,
        }
    }

    /// Bearer token for a project member.
    pub fn member_token(&self, user: i64) -> String {
        self.encoder
            .issue(Principal::Member(UserId::new(user)))
            .expect("issue token")
    }

    /// Bearer token for a privileged caller.
    pub fn admin_token(&self, user: i64) -> String {
        self.encoder
            .issue(Principal::Privileged(UserId::new(user)))
            .expect("issue token")
    }

    /// Send a JSON request and parse the JSON response.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let raw = self.send(req).await;
        let body: Value = serde_json::from_slice(&raw.body).unwrap_or(Value::Null);
        TestResponse {
            status: raw.status,
            body,
        }
    }

    /// Send an arbitrary request and keep the body as bytes.
    pub async fn send(&self, req: Request<Body>) -> RawResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), 4 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        RawResponse {
            status,
            headers,
            body,
        }
    }

    /// Run the pre-upload handshake for `name` in the default project.
    pub async fn pre_upload(&self, token: &str, name: &str, hash: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/files/pre-upload",
            Some(json!({
                "projectId": PROJECT,
                "name": name,
                "fileCategory": "text",
                "fileFormat": "txt",
                "sizeBytes": 11,
                "hash": hash,
            })),
            Some(token),
        )
        .await
    }

    /// Pre-upload and then PUT `content` to the returned URL, the way a
    /// client would. Returns the pre-upload payload.
    pub async fn upload(&self, token: &str, name: &str, hash: &str, content: &str) -> Value {
        let response = self.pre_upload(token, name, hash).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        let data = response.body["data"].clone();

        let store = self.store.as_ref().expect("storage configured");
        store
            .put_signed(
                data["uploadUrl"].as_str().expect("uploadUrl"),
                data["contentType"].as_str().expect("contentType"),
                Bytes::from(content.to_string()),
            )
            .await
            .expect("PUT to signed URL");
        data
    }

    /// Send a multipart upload built from `(name, filename, content_type, value)` parts.
    pub async fn multipart(
        &self,
        token: &str,
        parts: &[(&str, Option<&str>, Option<&str>, &str)],
    ) -> TestResponse {
        const BOUNDARY: &str = "assethub-test-boundary";
        let mut body = String::new();
        for (name, filename, content_type, value) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match filename {
                Some(filename) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n"
                )),
            }
            if let Some(content_type) = content_type {
                body.push_str(&format!("Content-Type: {content_type}\r\n"));
            }
            body.push_str("\r\n");
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let req = Request::builder()
            .method("POST")
            .uri("/api/files/upload")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::from(body))
            .expect("Failed to build request");

        let raw = self.send(req).await;
        TestResponse {
            status: raw.status,
            body: serde_json::from_slice(&raw.body).unwrap_or(Value::Null),
        }
    }

    /// GET with a bearer token, raw body.
    pub async fn get_raw(&self, path: &str, token: &str) -> RawResponse {
        let req = Request::builder()
            .method("GET")
            .uri(path)
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(req).await
    }
}
