use std::sync::Arc;

use podium::db::{NewSession, NewSessionDriver, Store};
use podium::services::{GuessError, GuessService, SeaOrmGuessService};

async fn memory_store() -> Arc<Store> {
    Arc::new(
        Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .expect("Failed to open in-memory store"),
    )
}

async fn seed_session(store: &Store, id: i32, date_start: &str) {
    store
        .insert_sessions(&[NewSession {
            id,
            name: "Race".to_string(),
            session_type: "Race".to_string(),
            country: Some("Mexico".to_string()),
            date_start: date_start.to_string(),
        }])
        .await
        .unwrap();

    store
        .insert_session_drivers(&[
            NewSessionDriver {
                session_id: id,
                driver_number: 44,
                driver_name: "Lewis Hamilton".to_string(),
                nationality: Some("GBR".to_string()),
                team: Some("Mercedes".to_string()),
            },
            NewSessionDriver {
                session_id: id,
                driver_number: 1,
                driver_name: "Max Verstappen".to_string(),
                nationality: Some("NED".to_string()),
                team: Some("Red Bull Racing".to_string()),
            },
            NewSessionDriver {
                session_id: id,
                driver_number: 16,
                driver_name: "Charles Leclerc".to_string(),
                nationality: Some("MON".to_string()),
                team: Some("Ferrari".to_string()),
            },
        ])
        .await
        .unwrap();
}

async fn seed_user(store: &Store, email: &str) {
    store.add_user_if_absent(email, "Ana").await.unwrap();
}

const FUTURE: &str = "2099-10-27T20:00:00+00:00";
const PAST: &str = "2020-10-25T20:00:00+00:00";

#[tokio::test]
async fn rejects_driver_not_entered_in_session() {
    let store = memory_store().await;
    seed_session(&store, 7, FUTURE).await;
    seed_user(&store, "ana@example.com").await;

    let service = SeaOrmGuessService::new(Arc::clone(&store));

    let err = service
        .submit_guess("ana@example.com", 7, (44, 1, 99))
        .await
        .unwrap_err();

    match err {
        GuessError::Invalid(reason) => assert_eq!(reason, "driver/session mismatch"),
        other => panic!("Expected validation failure, got {other:?}"),
    }

    assert!(store.find_guess("ana@example.com", 7).await.unwrap().is_none());
}

#[tokio::test]
async fn rejects_submission_after_session_start() {
    let store = memory_store().await;
    seed_session(&store, 42, PAST).await;
    seed_user(&store, "ana@example.com").await;

    let service = SeaOrmGuessService::new(Arc::clone(&store));

    let err = service
        .submit_guess("ana@example.com", 42, (44, 1, 16))
        .await
        .unwrap_err();

    match err {
        GuessError::Invalid(reason) => {
            assert_eq!(reason, "session already started or finished");
        }
        other => panic!("Expected validation failure, got {other:?}"),
    }

    // Nothing was created or modified.
    assert!(store.find_guess("ana@example.com", 42).await.unwrap().is_none());
}

#[tokio::test]
async fn second_submission_overwrites_the_first() {
    let store = memory_store().await;
    seed_session(&store, 7, FUTURE).await;
    seed_user(&store, "ana@example.com").await;

    let service = SeaOrmGuessService::new(Arc::clone(&store));

    let first = service
        .submit_guess("ana@example.com", 7, (44, 1, 16))
        .await
        .unwrap();

    let second = service
        .submit_guess("ana@example.com", 7, (16, 44, 1))
        .await
        .unwrap();

    // Same row, new fields.
    assert_eq!(first.id, second.id);

    let stored = store.list_guesses_for_session(7).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].position_1_driver_number, 16);
    assert_eq!(stored[0].position_2_driver_number, 44);
    assert_eq!(stored[0].position_3_driver_number, 1);
}

#[tokio::test]
async fn different_users_keep_separate_guesses() {
    let store = memory_store().await;
    seed_session(&store, 7, FUTURE).await;
    seed_user(&store, "ana@example.com").await;
    seed_user(&store, "luis@example.com").await;

    let service = SeaOrmGuessService::new(Arc::clone(&store));

    service
        .submit_guess("ana@example.com", 7, (44, 1, 16))
        .await
        .unwrap();
    service
        .submit_guess("luis@example.com", 7, (1, 44, 16))
        .await
        .unwrap();

    assert_eq!(store.list_guesses_for_session(7).await.unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_driver_across_slots_is_accepted() {
    // Distinctness across the three slots is intentionally not enforced.
    let store = memory_store().await;
    seed_session(&store, 7, FUTURE).await;
    seed_user(&store, "ana@example.com").await;

    let service = SeaOrmGuessService::new(Arc::clone(&store));

    let saved = service
        .submit_guess("ana@example.com", 7, (44, 44, 44))
        .await
        .unwrap();

    assert_eq!(saved.position_2_driver_number, 44);
}

#[tokio::test]
async fn sign_in_persistence_is_idempotent() {
    let store = memory_store().await;

    let first = store
        .add_user_if_absent("ana@example.com", "Ana")
        .await
        .unwrap();
    let second = store
        .add_user_if_absent("ana@example.com", "Ana Maria")
        .await
        .unwrap();

    // The stored username never changes after first sign-in.
    assert_eq!(first.username, "Ana");
    assert_eq!(second.username, "Ana");
}
