use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::state::SharedState;

pub mod auth;
mod error;
mod guesses;
mod sessions;
mod standings;
mod system;
mod tasks;
mod types;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: Instant::now(),
        prometheus_handle,
    })
}

#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    let cors = build_cors(&state.shared.config.server.cors_allowed_origins);

    let protected = Router::new()
        .route("/api/sessions", get(sessions::list_sessions))
        .route("/api/sessions/{id}/drivers", get(sessions::session_drivers))
        .route(
            "/api/sessions/{id}/standing",
            get(standings::session_standing),
        )
        .route("/api/sessions/{id}/winner", get(standings::session_winner))
        .route("/api/sessions/{id}/guess", get(guesses::my_guess))
        .route("/api/guesses", post(guesses::submit_guess))
        .route("/api/sync", post(tasks::run_sync))
        .route("/api/system/status", get(system::status))
        .route("/api/system/metrics", get(system::metrics))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_auth,
        ));

    Router::new()
        .route("/api/auth/google", post(auth::google_sign_in))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub async fn serve(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("API listening on port {}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
