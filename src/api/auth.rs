use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};

use super::{ApiError, ApiResponse, AppState, GoogleSignInRequest, SignInDto, UserDto};

/// Authenticated caller, injected by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

pub async fn google_sign_in(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GoogleSignInRequest>,
) -> Result<Json<ApiResponse<SignInDto>>, ApiError> {
    let signed_in = state.shared.auth.sign_in(&request.token).await?;

    Ok(Json(ApiResponse::success(SignInDto {
        access_token: signed_in.access_token,
        user: UserDto::from(signed_in.user),
    })))
}

/// Requires a valid bearer token and stashes the caller's email in request
/// extensions.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) if h.starts_with("Bearer ") => &h[7..],
        _ => return Err(StatusCode::UNAUTHORIZED),
    };

    let email = state
        .shared
        .auth
        .verify_access_token(token)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(AuthUser { email });

    Ok(next.run(request).await)
}
