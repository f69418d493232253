use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use super::{ApiError, ApiResponse, AppState, SessionDriverDto, SessionDto};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Number of latest sessions to return; all when omitted.
    pub limit: Option<u64>,
}

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<SessionDto>>>, ApiError> {
    let sessions = state
        .shared
        .store
        .list_recent_sessions(query.limit)
        .await?;

    let dtos = sessions.into_iter().map(SessionDto::from).collect();

    Ok(Json(ApiResponse::success(dtos)))
}

pub async fn session_drivers(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<SessionDriverDto>>>, ApiError> {
    if state.shared.store.get_session(session_id).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "Session {session_id} not found"
        )));
    }

    let drivers = state.shared.store.list_session_drivers(session_id).await?;

    let dtos = drivers.into_iter().map(SessionDriverDto::from).collect();

    Ok(Json(ApiResponse::success(dtos)))
}
