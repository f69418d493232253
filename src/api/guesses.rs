use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use super::auth::AuthUser;
use super::{ApiError, ApiResponse, AppState, GuessDto, SubmitGuessRequest};

pub async fn submit_guess(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SubmitGuessRequest>,
) -> Result<Json<ApiResponse<GuessDto>>, ApiError> {
    let saved = state
        .shared
        .guesses
        .submit_guess(
            &user.email,
            request.session_id,
            (
                request.position_1_driver_number,
                request.position_2_driver_number,
                request.position_3_driver_number,
            ),
        )
        .await?;

    Ok(Json(ApiResponse::success(GuessDto::from(saved))))
}

pub async fn my_guess(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<i32>,
) -> Result<Json<ApiResponse<Option<GuessDto>>>, ApiError> {
    let guess = state
        .shared
        .guesses
        .guess_for(&user.email, session_id)
        .await?;

    Ok(Json(ApiResponse::success(guess.map(GuessDto::from))))
}
