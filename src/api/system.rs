use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: u64,
    pub database_ok: bool,
}

pub async fn status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let database_ok = state.shared.store.ping().await.is_ok();

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        database_ok,
    })))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<String, ApiError> {
    state.prometheus_handle.as_ref().map_or_else(
        || {
            Err(ApiError::NotFound(
                "Metrics are disabled in config".to_string(),
            ))
        },
        |handle| Ok(handle.render()),
    )
}
