//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database = match &state.db_pool {
        None => "memory",
        Some(pool) => match pool.health_check().await {
            Ok(true) => "connected",
            Ok(false) | Err(_) => "unreachable",
        },
    };
    let storage = if state.storage_manager.is_configured() {
        "configured"
    } else {
        "not_configured"
    };
    let status = if database == "unreachable" || storage == "not_configured" {
        "degraded"
    } else {
        "ok"
    };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        storage: storage.to_string(),
        storage_provider: state.storage_manager.provider_type().map(str::to_string),
    }))
}
