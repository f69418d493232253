use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use super::{ApiError, ApiResponse, AppState, StandingDto, WinnerDto};

pub async fn session_standing(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<i32>,
) -> Result<Json<ApiResponse<StandingDto>>, ApiError> {
    let standings = state.shared.standings.get_standing(session_id).await?;

    Ok(Json(ApiResponse::success(StandingDto {
        session_id,
        standings,
    })))
}

pub async fn session_winner(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<i32>,
) -> Result<Json<ApiResponse<Option<WinnerDto>>>, ApiError> {
    let winner = state.shared.standings.get_winning_guess(session_id).await?;

    Ok(Json(ApiResponse::success(winner.map(WinnerDto::from))))
}
