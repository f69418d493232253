use std::sync::Arc;

use podium::db::{NewSession, NewSessionDriver, ResultRow, Store};
use podium::services::{SeaOrmStandingsService, StandingsService};

async fn memory_store() -> Arc<Store> {
    Arc::new(
        Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .expect("Failed to open in-memory store"),
    )
}

async fn seed_session(store: &Store, id: i32, driver_numbers: &[(i32, &str)]) {
    store
        .insert_sessions(&[NewSession {
            id,
            name: "Race".to_string(),
            session_type: "Race".to_string(),
            country: Some("Mexico".to_string()),
            date_start: "2020-10-25T20:00:00+00:00".to_string(),
        }])
        .await
        .unwrap();

    let rows: Vec<NewSessionDriver> = driver_numbers
        .iter()
        .map(|(number, name)| NewSessionDriver {
            session_id: id,
            driver_number: *number,
            driver_name: (*name).to_string(),
            nationality: None,
            team: None,
        })
        .collect();

    store.insert_session_drivers(&rows).await.unwrap();
}

async fn seed_result(store: &Store, session_id: i32, podium: (i32, i32, i32)) {
    store
        .upsert_session_results(&[ResultRow {
            session_id,
            position_1_driver_number: podium.0,
            position_2_driver_number: podium.1,
            position_3_driver_number: podium.2,
        }])
        .await
        .unwrap();
}

async fn seed_guess(store: &Store, email: &str, session_id: i32, picks: (i32, i32, i32)) {
    store.add_user_if_absent(email, email).await.unwrap();
    store.upsert_guess(email, session_id, picks).await.unwrap();
}

#[tokio::test]
async fn standing_is_empty_without_a_result() {
    let store = memory_store().await;
    seed_session(&store, 9, &[(4, "Lando Norris")]).await;

    let service = SeaOrmStandingsService::new(Arc::clone(&store));

    assert!(service.get_standing(9).await.unwrap().is_empty());
}

#[tokio::test]
async fn standing_enriches_names_and_omits_unknown_drivers() {
    let store = memory_store().await;
    seed_session(&store, 9, &[(4, "Lando Norris"), (11, "Sergio Perez")]).await;
    // P3 driver 55 has no entry row for this session.
    seed_result(&store, 9, (4, 11, 55)).await;

    let service = SeaOrmStandingsService::new(Arc::clone(&store));

    let standing = service.get_standing(9).await.unwrap();

    assert_eq!(standing.len(), 2);
    assert_eq!(standing[0].position, 1);
    assert_eq!(standing[0].driver_number, 4);
    assert_eq!(standing[0].driver_name, "Lando Norris");
    assert_eq!(standing[1].position, 2);
    assert_eq!(standing[1].driver_number, 11);
}

#[tokio::test]
async fn winner_requires_exact_position_match() {
    let store = memory_store().await;
    seed_session(
        &store,
        7,
        &[(44, "Lewis Hamilton"), (1, "Max Verstappen"), (16, "Charles Leclerc")],
    )
    .await;
    seed_result(&store, 7, (44, 1, 16)).await;

    // Right drivers in the wrong order earn nothing; inserted first to prove
    // the match is on content, not row order.
    seed_guess(&store, "luis@example.com", 7, (1, 44, 16)).await;
    seed_guess(&store, "ana@example.com", 7, (44, 1, 16)).await;

    let service = SeaOrmStandingsService::new(Arc::clone(&store));

    let winner = service.get_winning_guess(7).await.unwrap().unwrap();
    assert_eq!(winner.user_email, "ana@example.com");
}

#[tokio::test]
async fn no_winner_without_result_or_matching_guess() {
    let store = memory_store().await;
    seed_session(&store, 7, &[(44, "Lewis Hamilton"), (1, "Max Verstappen")]).await;
    seed_guess(&store, "ana@example.com", 7, (44, 1, 1)).await;

    let service = SeaOrmStandingsService::new(Arc::clone(&store));

    // No result stored yet: winner is not determinable.
    assert!(service.get_winning_guess(7).await.unwrap().is_none());

    seed_result(&store, 7, (1, 44, 16)).await;

    // A result exists but nobody matched it.
    assert!(service.get_winning_guess(7).await.unwrap().is_none());
}
