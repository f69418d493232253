use std::sync::Arc;

use axum::{Json, extract::State};

use super::{ApiError, ApiResponse, AppState};
use crate::scheduler::target_year;
use crate::services::SyncSummary;

/// Manual reconciliation trigger, same path the scheduler takes.
pub async fn run_sync(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SyncSummary>>, ApiError> {
    let year = target_year(state.shared.config.sync.year);
    let summary = state.shared.sync.sync_year(year).await;

    Ok(Json(ApiResponse::success(summary)))
}
