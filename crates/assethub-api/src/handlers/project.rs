//! Project-scoped listing.

use axum::Json;
use axum::extract::{Path, Query, State};

use assethub_core::types::PageResponse;
use assethub_database::FileListing;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::path::parse_project_id;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/projects/{id}/files?page=&pageSize=
pub async fn list_files(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<FileListing>>>> {
    let project = parse_project_id(&id)?;
    let page = state
        .file_service
        .list_project_files(&auth, project, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}
