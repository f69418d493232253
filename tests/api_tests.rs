use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use podium::clients::{
    DriverPayload, IdentityVerifier, PositionPayload, RaceDataGateway, SessionPayload,
    VerifiedIdentity,
};
use podium::config::Config;
use podium::db::{NewSession, NewSessionDriver, Store};
use podium::state::SharedState;
use tower::ServiceExt;

struct NullGateway;

#[async_trait::async_trait]
impl RaceDataGateway for NullGateway {
    async fn sessions_in_year(&self, _year: i32) -> Result<Option<Vec<SessionPayload>>> {
        Ok(None)
    }

    async fn session_by_key(&self, _key: i32) -> Result<Option<Vec<SessionPayload>>> {
        Ok(None)
    }

    async fn session_drivers(&self, _key: i32) -> Result<Option<Vec<DriverPayload>>> {
        Ok(None)
    }

    async fn driver_at_position(
        &self,
        _key: i32,
        _position: i32,
    ) -> Result<Option<PositionPayload>> {
        Ok(None)
    }
}

struct FakeVerifier;

#[async_trait::async_trait]
impl IdentityVerifier for FakeVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity> {
        if token == "good-provider-token" {
            Ok(VerifiedIdentity {
                email: "ana@example.com".to_string(),
                name: "Ana".to_string(),
            })
        } else {
            anyhow::bail!("unknown token")
        }
    }
}

async fn spawn_app() -> (Router, Arc<Store>) {
    let mut config = Config::default();
    config.auth.jwt_secret = Some("test-secret".to_string());

    let store = Arc::new(
        Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .expect("Failed to open in-memory store"),
    );

    let shared = SharedState::with_collaborators(
        config,
        Arc::clone(&store),
        Arc::new(NullGateway),
        Arc::new(FakeVerifier),
    );

    let state = podium::api::create_app_state(shared, None);
    (podium::api::router(state), store)
}

async fn seed_open_session(store: &Store, id: i32) {
    store
        .insert_sessions(&[NewSession {
            id,
            name: "Race".to_string(),
            session_type: "Race".to_string(),
            country: Some("Mexico".to_string()),
            date_start: "2099-10-27T20:00:00+00:00".to_string(),
        }])
        .await
        .unwrap();

    store
        .insert_session_drivers(&[
            NewSessionDriver {
                session_id: id,
                driver_number: 44,
                driver_name: "Lewis Hamilton".to_string(),
                nationality: None,
                team: None,
            },
            NewSessionDriver {
                session_id: id,
                driver_number: 1,
                driver_name: "Max Verstappen".to_string(),
                nationality: None,
                team: None,
            },
            NewSessionDriver {
                session_id: id,
                driver_number: 16,
                driver_name: "Charles Leclerc".to_string(),
                nationality: None,
                team: None,
            },
        ])
        .await
        .unwrap();
}

async fn sign_in(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/google")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"token":"good-provider-token"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    json["data"]["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let (app, _store) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/sessions")
                .header("Authorization", "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sign_in_issues_a_usable_token() {
    let (app, _store) = spawn_app().await;

    let token = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/sessions")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["success"], serde_json::json!(true));
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn sign_in_rejects_unknown_provider_tokens() {
    let (app, _store) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/google")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"token":"forged"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn guess_submission_distinguishes_bad_input_from_success() {
    let (app, store) = spawn_app().await;
    seed_open_session(&store, 7).await;

    let token = sign_in(&app).await;

    // Driver 99 is not entered in session 7: user-actionable 400.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/guesses")
                .header("Authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"session_id":7,"position_1_driver_number":44,"position_2_driver_number":1,"position_3_driver_number":99}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], serde_json::json!(false));
    assert_eq!(json["error"], serde_json::json!("driver/session mismatch"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/guesses")
                .header("Authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"session_id":7,"position_1_driver_number":44,"position_2_driver_number":1,"position_3_driver_number":16}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let stored = store.list_guesses_for_session(7).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].user_email, "ana@example.com");
}

#[tokio::test]
async fn my_guess_round_trip() {
    let (app, store) = spawn_app().await;
    seed_open_session(&store, 7).await;

    let token = sign_in(&app).await;

    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/guesses")
                .header("Authorization", format!("Bearer {token}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"session_id":7,"position_1_driver_number":16,"position_2_driver_number":44,"position_3_driver_number":1}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/sessions/7/guess")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["data"]["position_1_driver_number"], serde_json::json!(16));
}

#[tokio::test]
async fn session_drivers_404_for_unknown_session() {
    let (app, _store) = spawn_app().await;

    let token = sign_in(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/sessions/12345/drivers")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
