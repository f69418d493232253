use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use podium::clients::{OpenF1Client, RaceDataGateway};
use podium::config::OpenF1Config;

const SESSION_JSON: &str = r#"[{"session_key":9001,"session_name":"Race","session_type":"Race","country_name":"Mexico","date_start":"2024-10-27T20:00:00+00:00"}]"#;

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    format!("http://{addr}")
}

fn client_for(base_url: &str) -> OpenF1Client {
    OpenF1Client::new(&OpenF1Config {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
        max_attempts: 3,
        backoff_base_ms: 10,
        max_total_wait_seconds: 30,
    })
}

fn json_ok(body: &'static str) -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/json")],
        body,
    )
        .into_response()
}

#[tokio::test]
async fn honors_retry_after_hint_with_a_single_extra_request() {
    let hits = Arc::new(AtomicU32::new(0));
    let handler_hits = Arc::clone(&hits);

    let router = Router::new().route(
        "/sessions",
        get(move || {
            let hits = Arc::clone(&handler_hits);
            async move {
                if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                    (StatusCode::TOO_MANY_REQUESTS, [("Retry-After", "1")], "")
                        .into_response()
                } else {
                    json_ok(SESSION_JSON)
                }
            }
        }),
    );

    let base = spawn_stub(router).await;
    let client = client_for(&base);

    let started = Instant::now();
    let sessions = client.sessions_in_year(2024).await.unwrap().unwrap();

    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_key, 9001);
    // Exactly one retry, after sleeping the hinted duration.
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert!(started.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn retries_server_errors_with_backoff_until_success() {
    let hits = Arc::new(AtomicU32::new(0));
    let handler_hits = Arc::clone(&hits);

    let router = Router::new().route(
        "/sessions",
        get(move || {
            let hits = Arc::clone(&handler_hits);
            async move {
                if hits.fetch_add(1, Ordering::SeqCst) < 2 {
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                } else {
                    json_ok(SESSION_JSON)
                }
            }
        }),
    );

    let base = spawn_stub(router).await;
    let client = client_for(&base);

    let sessions = client.sessions_in_year(2024).await.unwrap().unwrap();

    assert_eq!(sessions.len(), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn gives_up_after_the_retry_budget() {
    let hits = Arc::new(AtomicU32::new(0));
    let handler_hits = Arc::clone(&hits);

    let router = Router::new().route(
        "/sessions",
        get(move || {
            let hits = Arc::clone(&handler_hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                StatusCode::SERVICE_UNAVAILABLE.into_response()
            }
        }),
    );

    let base = spawn_stub(router).await;
    let client = client_for(&base);

    assert!(client.sessions_in_year(2024).await.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn empty_and_unparseable_bodies_mean_no_data() {
    let router = Router::new()
        .route("/sessions", get(|| async { json_ok("") }))
        .route("/drivers", get(|| async { json_ok("surprise, not json") }));

    let base = spawn_stub(router).await;
    let client = client_for(&base);

    assert!(client.sessions_in_year(2024).await.unwrap().is_none());
    assert!(client.session_drivers(9001).await.unwrap().is_none());
}

#[tokio::test]
async fn client_errors_surface_as_fetch_failures() {
    let router = Router::new().route(
        "/sessions",
        get(|| async { StatusCode::NOT_FOUND.into_response() }),
    );

    let base = spawn_stub(router).await;
    let client = client_for(&base);

    assert!(client.sessions_in_year(2024).await.is_err());
}

#[tokio::test]
async fn position_lookup_returns_the_final_sample() {
    // The provider reports every holder of the position over the session.
    let router = Router::new().route(
        "/position",
        get(|| async {
            json_ok(
                r#"[{"driver_number":44,"position":1},{"driver_number":1,"position":1}]"#,
            )
        }),
    );

    let base = spawn_stub(router).await;
    let client = client_for(&base);

    let sample = client.driver_at_position(9001, 1).await.unwrap().unwrap();
    assert_eq!(sample.driver_number, 1);
}
