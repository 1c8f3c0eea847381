//! File handlers: upload handshake, upload-through, downloads, the content
//! proxy, version history, rollback and delete.

use axum::Json;
use axum::body::Body;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use assethub_core::error::AppError;
use assethub_core::types::{PageResponse, ProjectId};
use assethub_entity::file::FileVersion;
use assethub_service::{
    DownloadLink, PreUploadRequest, PreUploadResponse, UploadThroughRequest, VersionSelector,
};

use crate::dto::request::{DownloadQuery, PreUploadBody, RollbackBody, validate_body};
use crate::dto::response::{ApiResponse, DeleteResponse, RollbackResponse};
use crate::error::ApiResult;
use crate::extractors::path::{parse_file_id, parse_project_id};
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// POST /api/files/pre-upload
pub async fn pre_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<PreUploadBody>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<PreUploadResponse>>> {
    let Json(body) = body.map_err(|e| AppError::validation(e.body_text()))?;
    validate_body(&body)?;

    let response = state
        .upload_service
        .pre_upload(&auth, PreUploadRequest::from(body))
        .await?;
    Ok(Json(ApiResponse::ok(response)))
}

/// POST /api/files/upload (multipart, relayed through the gateway)
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<ApiResponse<PreUploadResponse>>> {
    let mut req = UploadThroughRequest::default();
    let mut project: Option<ProjectId> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            req.part_file_name = field.file_name().map(String::from);
            req.part_content_type = field.content_type().map(String::from);
            data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
            );
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
        match name.as_str() {
            "projectId" => project = Some(parse_project_id(text.trim())?),
            "name" => req.name = Some(text),
            "fileCategory" => req.category = Some(text),
            "fileFormat" => req.format = Some(text),
            "contentType" => req.content_type = Some(text),
            _ => {}
        }
    }

    req.project_id = project.ok_or_else(|| AppError::validation("projectId is required"))?;
    req.data = data.ok_or_else(|| AppError::validation("file is required"))?;

    let response = state.upload_service.upload_through(&auth, req).await?;
    Ok(Json(ApiResponse::ok(response)))
}

/// GET /api/files/{id}/download?versionId=&versionNumber=
pub async fn download(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    query: Result<Query<DownloadQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<DownloadLink>>> {
    let file_id = parse_file_id(&id)?;
    let Query(query) = query.map_err(|e| AppError::validation(e.body_text()))?;

    let link = state
        .download_service
        .download_url(&auth, file_id, VersionSelector::from(query))
        .await?;
    Ok(Json(ApiResponse::ok(link)))
}

/// GET /api/files/{id}/content
pub async fn content(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    query: Result<Query<DownloadQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let file_id = parse_file_id(&id)?;
    let Query(query) = query.map_err(|e| AppError::validation(e.body_text()))?;

    let content = state
        .download_service
        .open_content(&auth, file_id, VersionSelector::from(query))
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&content.content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    if let Ok(value) = HeaderValue::from_str(&content.cache_control) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    if let Some(length) = content.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }
    if let Ok(value) =
        HeaderValue::from_str(&format!("inline; filename=\"{}\"", content.file_name))
    {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((StatusCode::OK, headers, Body::from_stream(content.stream)).into_response())
}

/// GET /api/files/{id}/versions?page=&pageSize=
pub async fn list_versions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<FileVersion>>>> {
    let file_id = parse_file_id(&id)?;
    let page = state
        .version_service
        .list_versions(&auth, file_id, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/files/{id}/rollback
pub async fn rollback(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    body: Result<Json<RollbackBody>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<RollbackResponse>>> {
    let file_id = parse_file_id(&id)?;
    let Json(body) = body.map_err(|e| AppError::validation(e.body_text()))?;
    validate_body(&body)?;

    let version = state
        .version_service
        .rollback(&auth, file_id, body.version_number)
        .await?;
    Ok(Json(ApiResponse::ok(RollbackResponse {
        file_id,
        current_version_id: version.id,
        current_version_number: version.version_number,
    })))
}

/// DELETE /api/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<DeleteResponse>>> {
    let file_id = parse_file_id(&id)?;
    let deletion = state.file_service.delete(&auth, file_id).await?;
    Ok(Json(ApiResponse::ok(DeleteResponse::from(deletion))))
}
